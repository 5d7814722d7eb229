//! Serenity builders for editor surfaces

use crate::editor::{
    custom_id::ComponentId,
    surface::{
        ControlRow, ControlSurface, EditorReply, InputStyle, InputSurface, ModalValues, Notice,
        Tone, ToggleStyle,
    },
};
use poise::CreateReply;
use poise::serenity_prelude::{
    ActionRow, ActionRowComponent, ButtonStyle, ChannelId, ChannelType, Colour, CreateActionRow,
    CreateButton, CreateEmbed, CreateInputText, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateModal, CreateSelectMenu, CreateSelectMenuKind,
    InputTextStyle,
};

const fn button_style(style: ToggleStyle) -> ButtonStyle {
    match style {
        ToggleStyle::Filled | ToggleStyle::Confirm => ButtonStyle::Success,
        ToggleStyle::Empty => ButtonStyle::Secondary,
        ToggleStyle::Neutral => ButtonStyle::Primary,
        ToggleStyle::Danger => ButtonStyle::Danger,
    }
}

const fn tone_colour(tone: Tone) -> Colour {
    match tone {
        Tone::Info => Colour::BLURPLE,
        Tone::Success => Colour::DARK_GREEN,
        Tone::Warning => Colour::GOLD,
    }
}

/// Embed describing a control surface
#[must_use]
pub fn surface_embed(surface: &ControlSurface) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&surface.title)
        .description(&surface.description)
        .colour(Colour::BLURPLE);
    for (name, value) in &surface.fields {
        embed = embed.field(name, value, true);
    }
    embed
}

/// Embed for a notice
#[must_use]
pub fn notice_embed(notice: &Notice) -> CreateEmbed {
    CreateEmbed::new()
        .title(&notice.title)
        .description(&notice.text)
        .colour(tone_colour(notice.tone))
}

/// Component rows of a control surface
#[must_use]
pub fn action_rows(surface: &ControlSurface) -> Vec<CreateActionRow> {
    surface
        .rows
        .iter()
        .map(|row| match row {
            ControlRow::Buttons(toggles) => CreateActionRow::Buttons(
                toggles
                    .iter()
                    .map(|toggle| {
                        CreateButton::new(toggle.id.to_string())
                            .label(&toggle.label)
                            .style(button_style(toggle.style))
                    })
                    .collect(),
            ),
            ControlRow::ChannelSelect {
                id,
                placeholder,
                current,
            } => {
                let kind = CreateSelectMenuKind::Channel {
                    channel_types: Some(vec![ChannelType::Text]),
                    default_channels: current.map(|id| vec![ChannelId::new(id)]),
                };
                CreateActionRow::SelectMenu(
                    CreateSelectMenu::new(id.to_string(), kind)
                        .placeholder(placeholder)
                        .min_values(1)
                        .max_values(1),
                )
            }
        })
        .collect()
}

/// Embeds of a control surface, notice first
#[must_use]
pub fn surface_embeds(surface: &ControlSurface) -> Vec<CreateEmbed> {
    surface
        .notice
        .iter()
        .map(notice_embed)
        .chain(std::iter::once(surface_embed(surface)))
        .collect()
}

/// Modal for an input surface
#[must_use]
pub fn modal(surface: &InputSurface) -> CreateModal {
    let rows = surface
        .inputs
        .iter()
        .map(|input| {
            let style = match input.style {
                InputStyle::Short => InputTextStyle::Short,
                InputStyle::Paragraph => InputTextStyle::Paragraph,
            };
            let mut text = CreateInputText::new(style, &input.label, input.id.to_string())
                .required(input.required)
                .max_length(input.max_length);
            if !input.placeholder.is_empty() {
                text = text.placeholder(&input.placeholder);
            }
            if !input.value.is_empty() {
                text = text.value(&input.value);
            }
            CreateActionRow::InputText(text)
        })
        .collect();

    CreateModal::new(surface.id.to_string(), &surface.title).components(rows)
}

/// Response updating the message a component belongs to
#[must_use]
pub fn component_response(reply: &EditorReply) -> CreateInteractionResponse {
    match reply {
        EditorReply::Surface(surface) => CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .embeds(surface_embeds(surface))
                .components(action_rows(surface)),
        ),
        EditorReply::Prompt(input) => CreateInteractionResponse::Modal(modal(input)),
        EditorReply::Closed(notice) => CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .embeds(vec![notice_embed(notice)])
                .components(Vec::new()),
        ),
    }
}

/// Ephemeral reply opening a panel from a slash command
#[must_use]
pub fn command_reply(surface: &ControlSurface) -> CreateReply {
    let mut reply = CreateReply::default()
        .components(action_rows(surface))
        .ephemeral(true);
    for embed in surface_embeds(surface) {
        reply = reply.embed(embed);
    }
    reply
}

/// Ephemeral reply carrying a single notice
#[must_use]
pub fn notice_reply(notice: &Notice) -> CreateReply {
    CreateReply::default()
        .embed(notice_embed(notice))
        .ephemeral(true)
}

/// Collect submitted modal inputs by field name.
///
/// Inputs whose id doesn't parse are skipped; missing values read as blank.
#[must_use]
pub fn modal_values(rows: &[ActionRow]) -> ModalValues {
    rows.iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            ActionRowComponent::InputText(input) => {
                let id = ComponentId::parse(&input.custom_id).ok()?;
                Some((id.field, input.value.clone().unwrap_or_default()))
            }
            _ => None,
        })
        .collect()
}
