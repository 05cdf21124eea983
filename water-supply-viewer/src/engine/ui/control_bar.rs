use bevy::prelude::*;

use crate::engine::camera::viewport_camera::ResetView;
use crate::engine::flow::particles::{FlowCommand, FlowSettings};
use crate::engine::profile::chart::ToggleProfile;
use crate::engine::scene::lighting::{LightingCommand, LightingMode, LightingState};
use crate::engine::tour::guided_tour::{GuidedTour, TourCommand};

const BUTTON_IDLE: Color = Color::srgb(0.22, 0.24, 0.28);
const BUTTON_HOVERED: Color = Color::srgb(0.26, 0.28, 0.32);
const BUTTON_PRESSED: Color = Color::srgb(0.18, 0.20, 0.24);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlButton {
    Tour,
    Lighting,
    Flow,
    Profile,
    ResetView,
}

impl ControlButton {
    pub const ALL: [ControlButton; 5] = [
        ControlButton::Tour,
        ControlButton::Lighting,
        ControlButton::Flow,
        ControlButton::Profile,
        ControlButton::ResetView,
    ];
}

/// Text child of a control button.
#[derive(Component)]
pub struct ControlLabel(pub ControlButton);

/// Label for a button given the state it controls.
pub fn control_label(
    button: ControlButton,
    tour_running: bool,
    lighting: LightingMode,
    flow_visible: bool,
) -> &'static str {
    match button {
        ControlButton::Tour if tour_running => "Stop tour",
        ControlButton::Tour => "Start tour",
        ControlButton::Lighting => match lighting {
            LightingMode::Day => "Night",
            LightingMode::Night => "Day",
        },
        ControlButton::Flow if flow_visible => "Hide flow",
        ControlButton::Flow => "Show flow",
        ControlButton::Profile => "Profile",
        ControlButton::ResetView => "Reset view",
    }
}

pub fn spawn_control_bar(commands: &mut Commands) {
    commands
        .spawn((
            Name::new("ControlBar"),
            BackgroundColor(Color::srgba(0.10, 0.11, 0.13, 0.85)),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(12.0),
                top: Val::Px(12.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Row,
                padding: UiRect::all(Val::Px(6.0)),
                column_gap: Val::Px(6.0),
                ..default()
            },
        ))
        .with_children(|bar| {
            for button in ControlButton::ALL {
                bar.spawn((
                    button,
                    Button,
                    BackgroundColor(BUTTON_IDLE),
                    BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
                    Node {
                        min_width: Val::Px(92.0),
                        height: Val::Px(32.0),
                        padding: UiRect::axes(Val::Px(10.0), Val::Px(0.0)),
                        display: Display::Flex,
                        align_items: AlignItems::Center,
                        justify_content: JustifyContent::Center,
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                ))
                .with_children(|parent| {
                    parent.spawn((
                        ControlLabel(button),
                        Text::new(control_label(button, false, LightingMode::Day, true)),
                        TextFont {
                            font_size: 15.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 1.0, 1.0)),
                    ));
                });
            }
        });
}

pub fn control_bar_interactions(
    mut buttons: Query<
        (&Interaction, &ControlButton, &mut BackgroundColor),
        Changed<Interaction>,
    >,
    mut tour_commands: EventWriter<TourCommand>,
    mut lighting_commands: EventWriter<LightingCommand>,
    mut flow_commands: EventWriter<FlowCommand>,
    mut profile_toggles: EventWriter<ToggleProfile>,
    mut reset_view: EventWriter<ResetView>,
) {
    for (interaction, button, mut background) in &mut buttons {
        match *interaction {
            Interaction::Pressed => {
                *background = BackgroundColor(BUTTON_PRESSED);
                match button {
                    ControlButton::Tour => {
                        tour_commands.write(TourCommand::Toggle);
                    }
                    ControlButton::Lighting => {
                        lighting_commands.write(LightingCommand::Toggle);
                    }
                    ControlButton::Flow => {
                        flow_commands.write(FlowCommand::Toggle);
                    }
                    ControlButton::Profile => {
                        profile_toggles.write(ToggleProfile);
                    }
                    ControlButton::ResetView => {
                        reset_view.write(ResetView);
                    }
                }
            }
            Interaction::Hovered => *background = BackgroundColor(BUTTON_HOVERED),
            Interaction::None => *background = BackgroundColor(BUTTON_IDLE),
        }
    }
}

pub fn update_control_labels(
    tour: Res<GuidedTour>,
    lighting: Res<LightingState>,
    flow: Res<FlowSettings>,
    mut labels: Query<(&ControlLabel, &mut Text)>,
) {
    if !(tour.is_changed() || lighting.is_changed() || flow.is_changed()) {
        return;
    }
    for (label, mut text) in &mut labels {
        let value = control_label(label.0, tour.is_running(), lighting.mode, flow.visible);
        if text.0 != value {
            text.0 = value.to_string();
        }
    }
}
