use bevy::prelude::*;
use constants::stage::StageKey;

use crate::engine::infrastructure::sites::site;
use crate::engine::tour::guided_tour::TourStop;

const CARD_WIDTH: f32 = 320.0;

/// Text shown on the info card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardContent {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub facts: Vec<String>,
}

impl CardContent {
    pub fn for_stage(stage: StageKey) -> Self {
        let stage_site = site(stage);
        Self {
            title: stage_site.title.to_string(),
            subtitle: format!(
                "{} · Stage {} of {}",
                stage_site.summary,
                stage.index() + 1,
                StageKey::ALL.len()
            ),
            description: stage_site.description.to_string(),
            facts: stage_site.facts.iter().map(|fact| fact.to_string()).collect(),
        }
    }

    /// Card for a tour stop; stage stops reuse the stage card with the tour position added.
    pub fn for_stop(stop: &TourStop, index: usize, total: usize) -> Self {
        let position = format!("Tour stop {} of {}", index + 1, total);
        match stop.stage {
            Some(stage) => {
                let mut content = Self::for_stage(stage);
                content.subtitle = format!("{} · {}", content.subtitle, position);
                content
            }
            None => Self {
                title: stop.title.to_string(),
                subtitle: position,
                description: stop.description.to_string(),
                facts: Vec::new(),
            },
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct InfoCardState {
    pub visible: bool,
    pub content: Option<CardContent>,
}

impl InfoCardState {
    pub fn show(&mut self, content: CardContent) {
        self.content = Some(content);
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

#[derive(Component)]
pub struct InfoCardRoot;

#[derive(Component)]
pub struct InfoCardTitle;

#[derive(Component)]
pub struct InfoCardSubtitle;

#[derive(Component)]
pub struct InfoCardDescription;

#[derive(Component)]
pub struct InfoCardFacts;

#[derive(Component)]
pub struct InfoCardCloseButton;

pub fn spawn_info_card(commands: &mut Commands) {
    commands
        .spawn((
            InfoCardRoot,
            Name::new("InfoCard"),
            BackgroundColor(Color::srgba(0.10, 0.11, 0.13, 0.92)),
            BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
            Node {
                width: Val::Px(CARD_WIDTH),
                position_type: PositionType::Absolute,
                right: Val::Px(12.0),
                top: Val::Px(12.0),
                display: Display::None,
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(12.0)),
                row_gap: Val::Px(8.0),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
        ))
        .with_children(|card| {
            card.spawn(Node {
                width: Val::Percent(100.0),
                display: Display::Flex,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            })
            .with_children(|header| {
                header.spawn((
                    InfoCardTitle,
                    Text::new(""),
                    TextFont {
                        font_size: 20.0,
                        ..default()
                    },
                    TextColor(Color::srgb(1.0, 1.0, 1.0)),
                ));
                header
                    .spawn((
                        InfoCardCloseButton,
                        Name::new("InfoCardClose"),
                        Button,
                        BackgroundColor(Color::srgb(0.22, 0.24, 0.28)),
                        BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
                        Node {
                            width: Val::Px(24.0),
                            height: Val::Px(24.0),
                            display: Display::Flex,
                            align_items: AlignItems::Center,
                            justify_content: JustifyContent::Center,
                            border: UiRect::all(Val::Px(1.0)),
                            ..default()
                        },
                    ))
                    .with_children(|button| {
                        button.spawn((
                            Text::new("x"),
                            TextFont {
                                font_size: 16.0,
                                ..default()
                            },
                            TextColor(Color::srgb(1.0, 1.0, 1.0)),
                        ));
                    });
            });

            card.spawn((
                InfoCardSubtitle,
                Text::new(""),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(Color::srgb(0.55, 0.78, 0.95)),
            ));
            card.spawn((
                InfoCardDescription,
                Text::new(""),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(Color::srgb(0.88, 0.89, 0.92)),
            ));
            card.spawn((
                InfoCardFacts,
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.75, 0.77, 0.80)),
            ));
        });
}

/// Bullet list of facts, one per line.
pub fn format_facts(facts: &[String]) -> String {
    facts
        .iter()
        .map(|fact| format!("• {fact}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Push the card state into the UI nodes when it changes.
pub fn sync_info_card(
    state: Res<InfoCardState>,
    mut roots: Query<&mut Node, With<InfoCardRoot>>,
    mut texts: ParamSet<(
        Query<&mut Text, With<InfoCardTitle>>,
        Query<&mut Text, With<InfoCardSubtitle>>,
        Query<&mut Text, With<InfoCardDescription>>,
        Query<&mut Text, With<InfoCardFacts>>,
    )>,
) {
    if !state.is_changed() {
        return;
    }

    let visible = state.visible && state.content.is_some();
    for mut node in &mut roots {
        node.display = if visible { Display::Flex } else { Display::None };
    }

    let Some(content) = state.content.as_ref() else {
        return;
    };
    for mut text in &mut texts.p0() {
        text.0 = content.title.clone();
    }
    for mut text in &mut texts.p1() {
        text.0 = content.subtitle.clone();
    }
    for mut text in &mut texts.p2() {
        text.0 = content.description.clone();
    }
    for mut text in &mut texts.p3() {
        text.0 = format_facts(&content.facts);
    }
}

pub fn info_card_close_button(
    mut buttons: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<InfoCardCloseButton>),
    >,
    mut state: ResMut<InfoCardState>,
) {
    for (interaction, mut background) in &mut buttons {
        match *interaction {
            Interaction::Pressed => {
                *background = BackgroundColor(Color::srgb(0.18, 0.20, 0.24));
                state.hide();
            }
            Interaction::Hovered => *background = BackgroundColor(Color::srgb(0.26, 0.28, 0.32)),
            Interaction::None => *background = BackgroundColor(Color::srgb(0.22, 0.24, 0.28)),
        }
    }
}

pub fn close_info_card_on_escape(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<InfoCardState>,
) {
    if keyboard.just_pressed(KeyCode::Escape) && state.visible {
        state.hide();
    }
}
