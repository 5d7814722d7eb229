//! Control and input surfaces
//!
//! Editors describe what to show as plain values: a control surface (embed
//! text plus rows of toggles) or an input surface (a modal). The `ui` module
//! turns these into serenity builders, which keeps everything here testable.

use crate::editor::{
    CustomIdError, Draft,
    color::EmbedColor,
    custom_id::{ComponentId, ComponentKind},
    draft::CONTENT_MAX_LENGTH,
};
use std::collections::HashMap;
use std::str::FromStr;

/// Longest accepted color token
pub const COLOR_MAX_LENGTH: u16 = 20;
/// Longest accepted timestamp flag (`false`)
pub const FLAG_MAX_LENGTH: u16 = 5;
/// Limit for single line inputs
pub const SHORT_MAX_LENGTH: u16 = 2000;

/// Visual state of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStyle {
    /// The field it edits holds a value
    Filled,
    /// The field it edits is empty
    Empty,
    /// Navigation or neutral action
    Neutral,
    /// Confirming action
    Confirm,
    /// Destructive action
    Danger,
}

impl ToggleStyle {
    /// `Filled` when `populated`, `Empty` otherwise
    #[must_use]
    pub const fn reflecting(populated: bool) -> Self {
        if populated { Self::Filled } else { Self::Empty }
    }
}

/// A button on a control surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub id: ComponentId,
    pub label: String,
    pub style: ToggleStyle,
}

/// Last field segment of the button switching a draft's embed on and off
pub const EMBED_FIELD: &str = "embed";

impl Toggle {
    #[must_use]
    pub fn new(id: ComponentId, label: impl Into<String>, style: ToggleStyle) -> Self {
        Self {
            id,
            label: label.into(),
            style,
        }
    }

    /// Embed on/off switch, filled while the draft sends an embed
    #[must_use]
    pub fn embed_switch(id: ComponentId, draft: &Draft) -> Self {
        Self::new(id, "Embed", ToggleStyle::reflecting(draft.embed_enabled))
    }
}

/// One row of a control surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRow {
    Buttons(Vec<Toggle>),
    /// Single text channel picker
    ChannelSelect {
        id: ComponentId,
        placeholder: String,
        current: Option<u64>,
    },
}

/// Tone of a notice shown above a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
}

/// Short feedback message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub title: String,
    pub text: String,
}

impl Notice {
    #[must_use]
    pub fn info(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Info,
            title: title.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Success,
            title: title.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn warning(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Warning,
            title: title.into(),
            text: text.into(),
        }
    }
}

/// A panel of toggles describing the current state of a working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSurface {
    pub title: String,
    pub description: String,
    /// Name/value pairs listed under the description
    pub fields: Vec<(String, String)>,
    pub rows: Vec<ControlRow>,
    pub notice: Option<Notice>,
}

impl ControlSurface {
    #[must_use]
    pub fn with_notice(mut self, notice: Option<Notice>) -> Self {
        self.notice = notice;
        self
    }

    /// Every toggle on the surface, in order
    pub fn toggles(&self) -> impl Iterator<Item = &Toggle> {
        self.rows.iter().flat_map(|row| match row {
            ControlRow::Buttons(toggles) => toggles.as_slice(),
            ControlRow::ChannelSelect { .. } => [].as_slice(),
        })
    }

    /// Find a toggle by its field name
    #[must_use]
    pub fn toggle(&self, field: &str) -> Option<&Toggle> {
        self.toggles().find(|toggle| toggle.id.field == field)
    }
}

/// Single or multi line text input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStyle {
    Short,
    Paragraph,
}

/// One text input of an input surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub id: ComponentId,
    pub label: String,
    pub style: InputStyle,
    /// Pre-filled from the working copy
    pub value: String,
    pub placeholder: String,
    pub required: bool,
    pub max_length: u16,
}

/// A modal collecting new values for some fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSurface {
    pub id: ComponentId,
    pub title: String,
    pub inputs: Vec<InputField>,
}

/// What an editor wants shown after handling an interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorReply {
    /// Update the panel in place
    Surface(ControlSurface),
    /// Open a modal
    Prompt(InputSurface),
    /// Replace the panel with a final notice and no controls
    Closed(Notice),
}

/// Submitted modal values, keyed by input field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalValues(HashMap<String, String>);

impl ModalValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Submitted value, empty when the input was missing
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map_or("", String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ModalValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Draft field groups, each edited through one modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Content,
    Title,
    Author,
    Footer,
    /// Description, color, image, thumbnail and timestamp
    Settings,
}

impl DraftField {
    pub const ALL: [Self; 5] = [
        Self::Content,
        Self::Title,
        Self::Author,
        Self::Footer,
        Self::Settings,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Title => "title",
            Self::Author => "author",
            Self::Footer => "footer",
            Self::Settings => "settings",
        }
    }

    /// Button label on control surfaces
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Content => "Message",
            Self::Title => "Title",
            Self::Author => "Author",
            Self::Footer => "Footer",
            Self::Settings => "Settings",
        }
    }

    /// Whether the draft holds a value for this group
    #[must_use]
    pub fn is_populated(self, draft: &Draft) -> bool {
        match self {
            Self::Content => draft.content.is_some(),
            Self::Title => draft.title.is_some(),
            Self::Author => draft.author.is_some(),
            Self::Footer => draft.footer.is_some(),
            Self::Settings => {
                draft.description.is_some()
                    || draft.color.is_some()
                    || draft.image.is_some()
                    || draft.thumbnail.is_some()
                    || draft.timestamp
            }
        }
    }

    /// Modal for this group, pre-filled from `draft`.
    ///
    /// Input ids share the modal's scope and session.
    #[must_use]
    pub fn input_surface(self, draft: &Draft, modal: ComponentId, title: &str) -> InputSurface {
        let input = |name: &str,
                     label: &str,
                     style: InputStyle,
                     value: Option<&str>,
                     placeholder: &str,
                     required: bool,
                     max_length: u16| InputField {
            id: modal.sibling(name, ComponentKind::Input),
            label: label.to_string(),
            style,
            value: value.unwrap_or_default().to_string(),
            placeholder: placeholder.to_string(),
            required,
            max_length,
        };

        let inputs = match self {
            Self::Content => vec![input(
                "content",
                "Message content",
                InputStyle::Paragraph,
                draft.content.as_deref(),
                "Enter message content here",
                true,
                CONTENT_MAX_LENGTH,
            )],
            Self::Title => vec![
                input(
                    "title",
                    "Embed title",
                    InputStyle::Short,
                    draft.title.as_deref(),
                    "Enter embed title",
                    true,
                    SHORT_MAX_LENGTH,
                ),
                input(
                    "titleurl",
                    "Embed title URL",
                    InputStyle::Short,
                    draft.url.as_deref(),
                    "Enter embed title URL",
                    false,
                    SHORT_MAX_LENGTH,
                ),
            ],
            Self::Author => vec![
                input(
                    "author",
                    "Embed author",
                    InputStyle::Short,
                    draft.author.as_deref(),
                    "Enter embed author",
                    true,
                    SHORT_MAX_LENGTH,
                ),
                input(
                    "authorimage",
                    "Embed author image",
                    InputStyle::Short,
                    draft.author_icon.as_deref(),
                    "Enter image URL or server, user, client",
                    false,
                    SHORT_MAX_LENGTH,
                ),
            ],
            Self::Footer => vec![
                input(
                    "footer",
                    "Embed footer",
                    InputStyle::Short,
                    draft.footer.as_deref(),
                    "Enter embed footer",
                    true,
                    SHORT_MAX_LENGTH,
                ),
                input(
                    "footerimage",
                    "Embed footer image",
                    InputStyle::Short,
                    draft.footer_icon.as_deref(),
                    "Enter image URL or server, user, client",
                    false,
                    SHORT_MAX_LENGTH,
                ),
            ],
            Self::Settings => {
                let color = draft.color.map(|color| color.to_string());
                let timestamp = if draft.timestamp { "True" } else { "False" };
                vec![
                    input(
                        "description",
                        "Embed description",
                        InputStyle::Paragraph,
                        draft.description.as_deref(),
                        "Enter embed description",
                        false,
                        SHORT_MAX_LENGTH,
                    ),
                    input(
                        "color",
                        "Embed color",
                        InputStyle::Short,
                        color.as_deref(),
                        &EmbedColor::token_hint(),
                        false,
                        COLOR_MAX_LENGTH,
                    ),
                    input(
                        "image",
                        "Embed image",
                        InputStyle::Short,
                        draft.image.as_deref(),
                        "Enter image URL or server, user, client",
                        false,
                        SHORT_MAX_LENGTH,
                    ),
                    input(
                        "thumbnail",
                        "Embed thumbnail",
                        InputStyle::Short,
                        draft.thumbnail.as_deref(),
                        "Enter image URL or server, user, client",
                        false,
                        SHORT_MAX_LENGTH,
                    ),
                    input(
                        "timestamp",
                        "Embed timestamp",
                        InputStyle::Short,
                        Some(timestamp),
                        "True or false",
                        false,
                        FLAG_MAX_LENGTH,
                    ),
                ]
            }
        };

        InputSurface {
            id: modal,
            title: title.to_string(),
            inputs,
        }
    }

    /// Apply submitted modal values to `draft`; blank values change nothing
    pub fn apply(self, draft: &mut Draft, values: &ModalValues) {
        match self {
            Self::Content => draft.set_content(values.get("content")),
            Self::Title => draft.set_title(values.get("title"), Some(values.get("titleurl"))),
            Self::Author => {
                draft.set_author(values.get("author"), Some(values.get("authorimage")));
            }
            Self::Footer => {
                draft.set_footer(values.get("footer"), Some(values.get("footerimage")));
            }
            Self::Settings => {
                draft.set_description(values.get("description"));
                draft.set_color(values.get("color"));
                draft.set_image(values.get("image"));
                draft.set_thumbnail(values.get("thumbnail"));
                draft.set_timestamp(values.get("timestamp"));
            }
        }
    }
}

impl FromStr for DraftField {
    type Err = CustomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| CustomIdError::UnknownField {
                scope: "draft".to_string(),
                field: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::custom_id::{Scope, SessionKey};

    fn modal_id(field: DraftField) -> ComponentId {
        ComponentId::new(
            Scope::Message,
            SessionKey::member(1, 2),
            field.as_str(),
            ComponentKind::Modal,
        )
    }

    #[test]
    fn test_field_round_trips_through_name() {
        for field in DraftField::ALL {
            assert_eq!(field.as_str().parse::<DraftField>().unwrap(), field);
        }
        assert!("embed".parse::<DraftField>().is_err());
    }

    #[test]
    fn test_content_surface_prefilled() {
        let mut draft = Draft::new();
        draft.set_content("hello");
        let surface = DraftField::Content.input_surface(
            &draft,
            modal_id(DraftField::Content),
            "Message constructor",
        );

        assert_eq!(surface.id.to_string(), "message-1.2-content-modal");
        assert_eq!(surface.inputs.len(), 1);
        let input = &surface.inputs[0];
        assert_eq!(input.id.to_string(), "message-1.2-content-input");
        assert_eq!(input.value, "hello");
        assert_eq!(input.max_length, 2000);
        assert!(input.required);
        assert_eq!(input.style, InputStyle::Paragraph);
    }

    #[test]
    fn test_settings_surface_limits() {
        let mut draft = Draft::new();
        draft.set_color("warning");
        let surface = DraftField::Settings.input_surface(
            &draft,
            modal_id(DraftField::Settings),
            "Message constructor",
        );

        assert_eq!(surface.inputs.len(), 5);
        let color = surface
            .inputs
            .iter()
            .find(|input| input.id.field == "color")
            .unwrap();
        assert_eq!(color.max_length, COLOR_MAX_LENGTH);
        assert_eq!(color.value, "warning");
        let timestamp = surface
            .inputs
            .iter()
            .find(|input| input.id.field == "timestamp")
            .unwrap();
        assert_eq!(timestamp.value, "False");
    }

    #[test]
    fn test_apply_title_and_url() {
        let mut draft = Draft::new();
        let values: ModalValues = [("title", "Hello"), ("titleurl", "https://example.com")]
            .into_iter()
            .collect();
        DraftField::Title.apply(&mut draft, &values);
        assert_eq!(draft.title.as_deref(), Some("Hello"));
        assert_eq!(draft.url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_apply_blank_settings_changes_nothing() {
        let mut draft = Draft::new();
        draft.set_description("Body");
        draft.set_color("tertiary");
        draft.set_image("server");
        let before = draft.clone();

        let values: ModalValues = [
            ("description", ""),
            ("color", " "),
            ("image", ""),
            ("thumbnail", ""),
            ("timestamp", ""),
        ]
        .into_iter()
        .collect();
        DraftField::Settings.apply(&mut draft, &values);
        assert_eq!(draft, before);
    }

    #[test]
    fn test_apply_with_missing_inputs_changes_nothing() {
        let mut draft = Draft::new();
        draft.set_author("Author", Some("user"));
        let before = draft.clone();
        DraftField::Author.apply(&mut draft, &ModalValues::new());
        assert_eq!(draft, before);
    }

    #[test]
    fn test_populated_reflects_draft() {
        let mut draft = Draft::new();
        assert!(!DraftField::Title.is_populated(&draft));
        draft.set_title("t", None);
        assert!(DraftField::Title.is_populated(&draft));
        assert!(!DraftField::Settings.is_populated(&draft));
        draft.set_color("success");
        assert!(DraftField::Settings.is_populated(&draft));
    }
}
