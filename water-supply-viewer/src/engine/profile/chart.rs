use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use constants::stage::StageKey;

use super::elevation::ElevationProfile;
use crate::constants::render_settings::{PROFILE_CHART_HEIGHT, PROFILE_CHART_WIDTH};
use crate::engine::infrastructure::highlight::SelectedStage;

const BACKGROUND: [u8; 4] = [18, 20, 24, 220];
const FILL: [u8; 4] = [52, 98, 138, 230];
const LINE: [u8; 4] = [150, 205, 255, 255];
const MARKER: [u8; 4] = [170, 170, 175, 150];
const HIGHLIGHT: [u8; 4] = [255, 206, 90, 255];

/// Empty rows kept above and below the curve.
const VERTICAL_MARGIN: u32 = 8;

/// Smallest height span drawn, so flat profiles do not blow up.
const MIN_HEIGHT_SPAN: f32 = 1.0;

fn put(pixels: &mut [u8], width: u32, x: u32, y: u32, colour: [u8; 4]) {
    let offset = ((y * width + x) * 4) as usize;
    pixels[offset..offset + 4].copy_from_slice(&colour);
}

fn column_for(distance: f32, total: f32, width: u32) -> u32 {
    ((distance / total).clamp(0.0, 1.0) * (width - 1) as f32).round() as u32
}

/// Render the profile into an RGBA8 buffer of `width * height * 4` bytes:
/// filled area, curve line and one marker line per stage.
pub fn rasterise_profile(
    profile: &ElevationProfile,
    width: u32,
    height: u32,
    highlight: Option<StageKey>,
) -> Vec<u8> {
    let mut pixels = BACKGROUND.repeat((width * height) as usize);
    let total = profile.total_distance();
    if width < 2 || height < 2 || profile.samples.len() < 2 || total <= 0.0 {
        return pixels;
    }

    let margin = VERTICAL_MARGIN.min((height - 1) / 2);
    let top = margin as f32;
    let bottom = (height - 1 - margin) as f32;
    let low = profile.min_height();
    let span = (profile.max_height() - low).max(MIN_HEIGHT_SPAN);

    let row_for = |value: f32| -> u32 {
        let t = ((value - low) / span).clamp(0.0, 1.0);
        (bottom - t * (bottom - top)).round() as u32
    };

    for marker in &profile.markers {
        let colour = if Some(marker.stage) == highlight {
            HIGHLIGHT
        } else {
            MARKER
        };
        let column = column_for(marker.distance, total, width);
        for y in 0..height {
            put(&mut pixels, width, column, y, colour);
        }
    }

    let mut previous_row: Option<u32> = None;
    for x in 0..width {
        let distance = total * x as f32 / (width - 1) as f32;
        let Some(value) = profile.height_at(distance) else {
            continue;
        };
        let row = row_for(value);

        for y in (row + 1)..height {
            put(&mut pixels, width, x, y, FILL);
        }

        // Join to the previous column so steep drops stay connected.
        let (from, to) = match previous_row {
            Some(previous) => (previous.min(row), previous.max(row)),
            None => (row, row),
        };
        for y in from..=to {
            put(&mut pixels, width, x, y, LINE);
        }
        previous_row = Some(row);
    }

    if let Some(marker) = highlight.and_then(|stage| profile.marker(stage)) {
        let column = column_for(marker.distance, total, width);
        for y in 0..margin {
            put(&mut pixels, width, column, y, HIGHLIGHT);
        }
    }

    pixels
}

/// Chart image and the stage it was last drawn with.
#[derive(Resource)]
pub struct ProfileChart {
    pub image: Handle<Image>,
    drawn_highlight: Option<StageKey>,
}

#[derive(Component)]
pub struct ProfilePanel;

#[derive(Event, Debug, Clone, Copy)]
pub struct ToggleProfile;

fn chart_image(pixels: Vec<u8>) -> Image {
    Image::new(
        Extent3d {
            width: PROFILE_CHART_WIDTH,
            height: PROFILE_CHART_HEIGHT,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        pixels,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

/// Bottom-left panel with a caption above the chart image.
pub fn spawn_profile_panel(
    commands: &mut Commands,
    images: &mut Assets<Image>,
    profile: &ElevationProfile,
) {
    let pixels = rasterise_profile(profile, PROFILE_CHART_WIDTH, PROFILE_CHART_HEIGHT, None);
    let image = images.add(chart_image(pixels));

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(12.0),
                bottom: Val::Px(12.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(8.0)),
                row_gap: Val::Px(4.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.10, 0.11, 0.13, 0.85)),
            ProfilePanel,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(format!(
                    "Elevation profile  {:.0} m to {:.0} m over {:.0} m",
                    profile.max_height(),
                    profile.min_height(),
                    profile.total_distance()
                )),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.87, 0.90)),
            ));
            parent.spawn((
                ImageNode::new(image.clone()),
                Node {
                    width: Val::Px(PROFILE_CHART_WIDTH as f32),
                    height: Val::Px(PROFILE_CHART_HEIGHT as f32),
                    ..default()
                },
            ));
        });

    commands.insert_resource(ProfileChart {
        image,
        drawn_highlight: None,
    });
}

/// Redraw the chart when the selected stage changes.
pub fn update_profile_chart(
    selected: Res<SelectedStage>,
    profile: Option<Res<ElevationProfile>>,
    chart: Option<ResMut<ProfileChart>>,
    mut images: ResMut<Assets<Image>>,
) {
    let (Some(profile), Some(mut chart)) = (profile, chart) else {
        return;
    };
    if chart.drawn_highlight == selected.0 {
        return;
    }

    let pixels = rasterise_profile(
        &profile,
        PROFILE_CHART_WIDTH,
        PROFILE_CHART_HEIGHT,
        selected.0,
    );
    if let Some(image) = images.get_mut(&chart.image) {
        image.data = Some(pixels);
    }
    chart.drawn_highlight = selected.0;
}

pub fn toggle_profile_panel(
    mut events: EventReader<ToggleProfile>,
    mut panels: Query<&mut Visibility, With<ProfilePanel>>,
) {
    for _ in events.read() {
        for mut visibility in &mut panels {
            *visibility = match *visibility {
                Visibility::Hidden => Visibility::Inherited,
                _ => Visibility::Hidden,
            };
        }
    }
}

pub fn profile_keyboard_shortcut(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut events: EventWriter<ToggleProfile>,
) {
    if keyboard.just_pressed(KeyCode::KeyG) {
        events.write(ToggleProfile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::profile::elevation::{ProfileSample, StageMarker};

    fn ramp() -> ElevationProfile {
        ElevationProfile {
            samples: (0..=10)
                .map(|i| ProfileSample {
                    distance: i as f32 * 10.0,
                    height: 50.0 - i as f32 * 4.0,
                    stage: if i < 5 {
                        StageKey::Lake
                    } else {
                        StageKey::Dam
                    },
                })
                .collect(),
            markers: vec![
                StageMarker {
                    stage: StageKey::Lake,
                    distance: 0.0,
                },
                StageMarker {
                    stage: StageKey::Dam,
                    distance: 50.0,
                },
            ],
        }
    }

    fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            pixels[offset],
            pixels[offset + 1],
            pixels[offset + 2],
            pixels[offset + 3],
        ]
    }

    #[test]
    fn output_length_matches_size() {
        for (w, h) in [(0, 0), (1, 1), (10, 3), (64, 32)] {
            assert_eq!(rasterise_profile(&ramp(), w, h, None).len(), (w * h * 4) as usize);
        }
    }

    #[test]
    fn empty_profile_is_background_only() {
        let pixels = rasterise_profile(&ElevationProfile::default(), 16, 8, None);
        assert!(pixels.chunks(4).all(|p| p == BACKGROUND));
    }

    #[test]
    fn ramp_fills_under_the_curve() {
        let (w, h) = (101, 60);
        let pixels = rasterise_profile(&ramp(), w, h, None);
        // Descending profile: high on the left, low on the right.
        assert_eq!(pixel(&pixels, w, 20, h - 5), FILL);
        assert_eq!(pixel(&pixels, w, 20, VERTICAL_MARGIN), BACKGROUND);
        assert_eq!(pixel(&pixels, w, 90, VERTICAL_MARGIN + 2), BACKGROUND);
        assert_eq!(pixel(&pixels, w, 90, h - 1), FILL);
    }

    #[test]
    fn highlighted_marker_is_drawn_brighter() {
        let (w, h) = (101, 60);
        let plain = rasterise_profile(&ramp(), w, h, None);
        let lit = rasterise_profile(&ramp(), w, h, Some(StageKey::Dam));
        assert_eq!(pixel(&plain, w, 50, 1), MARKER);
        assert_eq!(pixel(&lit, w, 50, 1), HIGHLIGHT);
        assert_ne!(plain, lit);
    }
}
