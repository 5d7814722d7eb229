//! Message composer
//!
//! Drives the `/message` workflow: one draft per member and guild, a panel of
//! toggles, a modal per field group and a send button that commits the draft
//! through a [`SendSink`]. Sending keeps the draft so it can be tweaked and
//! sent again.

use crate::INTERACTION_TARGET;
use crate::editor::{
    CustomIdError, Draft, EditorError,
    custom_id::{ComponentId, ComponentKind, Scope, SessionKey},
    image::ImageResolver,
    sink::SendSink,
    store::DraftStore,
    surface::{
        ControlRow, ControlSurface, DraftField, EMBED_FIELD, EditorReply, ModalValues, Notice,
        Toggle, ToggleStyle,
    },
};
use tracing::{info, warn};

/// Title shown on the panel and on every modal
pub const COMPOSER_TITLE: &str = "Message constructor";

/// Something the user asked the composer to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerAction {
    /// Show the panel, creating the draft when needed
    Open,
    /// Ask for new values of a field group
    Edit(DraftField),
    /// Apply submitted values of a field group
    Submit(DraftField, ModalValues),
    /// Switch the embed on or off, keeping its fields
    ToggleEmbed,
    /// Replace the draft with an empty one
    Reset,
    /// Drop the draft and close the panel
    Cancel,
    /// Commit the draft
    Send,
}

impl ComposerAction {
    /// Route a component interaction of the message scope.
    ///
    /// Modal submissions carry `values`, buttons don't.
    ///
    /// # Errors
    ///
    /// Returns [`CustomIdError::UnknownField`] for fields this composer
    /// never issued.
    pub fn from_component(id: &ComponentId, values: Option<ModalValues>) -> Result<Self, CustomIdError> {
        let unknown = || CustomIdError::UnknownField {
            scope: id.scope.to_string(),
            field: id.field.clone(),
        };

        match (id.kind, id.field.as_str()) {
            (ComponentKind::Button, "reset") => Ok(Self::Reset),
            (ComponentKind::Button, "cancel") => Ok(Self::Cancel),
            (ComponentKind::Button, "send") => Ok(Self::Send),
            (ComponentKind::Button, EMBED_FIELD) => Ok(Self::ToggleEmbed),
            (ComponentKind::Button, field) => {
                field.parse().map(Self::Edit).map_err(|_| unknown())
            }
            (ComponentKind::Modal, field) => {
                let field = field.parse().map_err(|_| unknown())?;
                Ok(Self::Submit(field, values.unwrap_or_default()))
            }
            _ => Err(unknown()),
        }
    }
}

/// The `/message` editor
#[derive(Debug, Clone)]
pub struct MessageComposer {
    drafts: DraftStore<Draft>,
}

impl MessageComposer {
    #[must_use]
    pub fn new(drafts: DraftStore<Draft>) -> Self {
        Self { drafts }
    }

    #[must_use]
    pub fn drafts(&self) -> &DraftStore<Draft> {
        &self.drafts
    }

    /// Handle one action for `session`.
    ///
    /// A missing draft (expired, or lost on restart) is recreated empty, so
    /// stale panels keep working.
    pub async fn handle(
        &self,
        session: SessionKey,
        action: ComposerAction,
        sink: &dyn SendSink,
        images: &dyn ImageResolver,
    ) -> EditorReply {
        match action {
            ComposerAction::Open => {
                let draft = self.drafts.get_or_create(&session);
                EditorReply::Surface(control_surface(session, &draft))
            }
            ComposerAction::Edit(field) => {
                let draft = self.drafts.get_or_create(&session);
                let modal = field_id(session, field.as_str(), ComponentKind::Modal);
                EditorReply::Prompt(field.input_surface(&draft, modal, COMPOSER_TITLE))
            }
            ComposerAction::Submit(field, values) => {
                let draft = self.drafts.update(&session, |draft| field.apply(draft, &values));
                EditorReply::Surface(control_surface(session, &draft))
            }
            ComposerAction::ToggleEmbed => {
                let draft = self
                    .drafts
                    .update(&session, |draft| draft.set_embed_enabled(!draft.embed_enabled));
                EditorReply::Surface(control_surface(session, &draft))
            }
            ComposerAction::Reset => {
                let draft = self.drafts.reset(&session);
                info!(target: INTERACTION_TARGET, session = %session, "Draft reset");
                EditorReply::Surface(control_surface(session, &draft))
            }
            ComposerAction::Cancel => {
                self.drafts.delete(&session);
                info!(target: INTERACTION_TARGET, session = %session, "Draft cancelled");
                EditorReply::Closed(Notice::success(
                    "Cancelled",
                    "Message constructor was cancelled and its draft deleted",
                ))
            }
            ComposerAction::Send => {
                let draft = self.drafts.get_or_create(&session);
                let notice = commit(session, &draft, sink, images).await;
                EditorReply::Surface(control_surface(session, &draft).with_notice(Some(notice)))
            }
        }
    }
}

/// Render and deliver `draft`, reporting the outcome as a notice
async fn commit(
    session: SessionKey,
    draft: &Draft,
    sink: &dyn SendSink,
    images: &dyn ImageResolver,
) -> Notice {
    let result = match draft.render(images) {
        Ok(message) => sink.send(message).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            info!(target: INTERACTION_TARGET, session = %session, draft = %draft.id, "Draft sent");
            Notice::success("Sent", "Message was sent")
        }
        Err(EditorError::NothingToSend) => {
            Notice::warning("Warning", EditorError::NothingToSend.to_string())
        }
        Err(e) => {
            warn!(target: INTERACTION_TARGET, session = %session, "Send failed: {e}");
            Notice::warning("Warning", e.to_string())
        }
    }
}

fn field_id(session: SessionKey, field: &str, kind: ComponentKind) -> ComponentId {
    ComponentId::new(Scope::Message, session, field, kind)
}

/// Panel for `draft`; each field toggle reflects whether it is populated and
/// the embed switch whether the embed is sent
#[must_use]
pub fn control_surface(session: SessionKey, draft: &Draft) -> ControlSurface {
    let toggle = |field: DraftField| {
        Toggle::new(
            field_id(session, field.as_str(), ComponentKind::Button),
            field.label(),
            ToggleStyle::reflecting(field.is_populated(draft)),
        )
    };
    let action = |name: &str, label: &str, style: ToggleStyle| {
        Toggle::new(field_id(session, name, ComponentKind::Button), label, style)
    };

    ControlSurface {
        title: COMPOSER_TITLE.to_string(),
        description: "Use the buttons below to build your message, then send it to this channel"
            .to_string(),
        fields: Vec::new(),
        rows: vec![
            ControlRow::Buttons(vec![
                Toggle::embed_switch(field_id(session, EMBED_FIELD, ComponentKind::Button), draft),
                toggle(DraftField::Settings),
                toggle(DraftField::Title),
                toggle(DraftField::Author),
                toggle(DraftField::Footer),
            ]),
            ControlRow::Buttons(vec![
                action("reset", "Reset", ToggleStyle::Danger),
                action("cancel", "Cancel", ToggleStyle::Danger),
                action("send", "Send", ToggleStyle::Confirm),
                toggle(DraftField::Content),
            ]),
        ],
        notice: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{
        image::ImageContext,
        sink::MockSendSink,
        store::EvictionPolicy,
        surface::{InputSurface, Tone},
    };

    const SESSION: SessionKey = SessionKey::member(10, 20);

    fn composer() -> MessageComposer {
        MessageComposer::new(DraftStore::new("message", EvictionPolicy::unbounded()))
    }

    fn values(pairs: &[(&str, &str)]) -> ModalValues {
        pairs.iter().copied().collect()
    }

    async fn run(composer: &MessageComposer, action: ComposerAction, sink: &MockSendSink) -> EditorReply {
        composer
            .handle(SESSION, action, sink, &ImageContext::default())
            .await
    }

    fn surface(reply: EditorReply) -> ControlSurface {
        match reply {
            EditorReply::Surface(surface) => surface,
            other => panic!("expected a control surface, got {other:?}"),
        }
    }

    fn prompt(reply: EditorReply) -> InputSurface {
        match reply {
            EditorReply::Prompt(prompt) => prompt,
            other => panic!("expected an input surface, got {other:?}"),
        }
    }

    #[test]
    fn test_routing_buttons_and_modals() {
        let button = field_id(SESSION, "title", ComponentKind::Button);
        assert_eq!(
            ComposerAction::from_component(&button, None).unwrap(),
            ComposerAction::Edit(DraftField::Title)
        );

        let send = field_id(SESSION, "send", ComponentKind::Button);
        assert_eq!(
            ComposerAction::from_component(&send, None).unwrap(),
            ComposerAction::Send
        );

        let embed = field_id(SESSION, "embed", ComponentKind::Button);
        assert_eq!(
            ComposerAction::from_component(&embed, None).unwrap(),
            ComposerAction::ToggleEmbed
        );

        let modal = field_id(SESSION, "content", ComponentKind::Modal);
        let submitted = values(&[("content", "hi")]);
        assert_eq!(
            ComposerAction::from_component(&modal, Some(submitted.clone())).unwrap(),
            ComposerAction::Submit(DraftField::Content, submitted)
        );

        let bogus = field_id(SESSION, "bogus", ComponentKind::Button);
        assert!(ComposerAction::from_component(&bogus, None).is_err());
        let select = field_id(SESSION, "title", ComponentKind::Select);
        assert!(ComposerAction::from_component(&select, None).is_err());
    }

    #[tokio::test]
    async fn test_open_shows_empty_panel() {
        let composer = composer();
        let sink = MockSendSink::new();

        let panel = surface(run(&composer, ComposerAction::Open, &sink).await);
        assert_eq!(panel.toggles().count(), 9);
        assert_eq!(panel.toggle("embed").unwrap().style, ToggleStyle::Empty);
        assert_eq!(panel.toggle("title").unwrap().style, ToggleStyle::Empty);
        assert_eq!(panel.toggle("content").unwrap().style, ToggleStyle::Empty);
        assert!(composer.drafts().contains(&SESSION));
    }

    #[tokio::test]
    async fn test_edit_prompts_prefilled_modal() {
        let composer = composer();
        composer.drafts().update(&SESSION, |draft| draft.set_title("Old", None));
        let sink = MockSendSink::new();

        let modal = prompt(run(&composer, ComposerAction::Edit(DraftField::Title), &sink).await);
        assert_eq!(modal.id.to_string(), "message-10.20-title-modal");
        assert_eq!(modal.inputs[0].value, "Old");
    }

    #[tokio::test]
    async fn test_submit_updates_toggles() {
        let composer = composer();
        let sink = MockSendSink::new();

        let action = ComposerAction::Submit(DraftField::Author, values(&[("author", "Herald")]));
        let panel = surface(run(&composer, action, &sink).await);
        assert_eq!(panel.toggle("author").unwrap().style, ToggleStyle::Filled);
        assert_eq!(panel.toggle("embed").unwrap().style, ToggleStyle::Filled);
        assert_eq!(panel.toggle("settings").unwrap().style, ToggleStyle::Empty);
    }

    #[tokio::test]
    async fn test_embed_switch_drops_embed_but_keeps_fields() {
        let composer = composer();
        composer.drafts().update(&SESSION, |draft| {
            draft.set_content("hello");
            draft.set_title("Title", None);
        });
        let mut sink = MockSendSink::new();
        sink.expect_send()
            .times(1)
            .withf(|message| message.content.as_deref() == Some("hello") && message.embed.is_none())
            .returning(|_| Ok(()));

        let panel = surface(run(&composer, ComposerAction::ToggleEmbed, &sink).await);
        assert_eq!(panel.toggle("embed").unwrap().style, ToggleStyle::Empty);
        assert_eq!(panel.toggle("title").unwrap().style, ToggleStyle::Filled);

        run(&composer, ComposerAction::Send, &sink).await;
        let draft = composer.drafts().get(&SESSION).unwrap();
        assert_eq!(draft.title.as_deref(), Some("Title"));

        let panel = surface(run(&composer, ComposerAction::ToggleEmbed, &sink).await);
        assert_eq!(panel.toggle("embed").unwrap().style, ToggleStyle::Filled);
    }

    #[tokio::test]
    async fn test_blank_submit_keeps_previous_value() {
        let composer = composer();
        let sink = MockSendSink::new();

        let action = ComposerAction::Submit(DraftField::Content, values(&[("content", "keep")]));
        run(&composer, action, &sink).await;
        let action = ComposerAction::Submit(DraftField::Content, values(&[("content", "   ")]));
        run(&composer, action, &sink).await;

        let draft = composer.drafts().get(&SESSION).unwrap();
        assert_eq!(draft.content.as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn test_empty_send_is_refused_without_delivery() {
        let composer = composer();
        let mut sink = MockSendSink::new();
        sink.expect_send().never();

        let panel = surface(run(&composer, ComposerAction::Send, &sink).await);
        let notice = panel.notice.unwrap();
        assert_eq!(notice.tone, Tone::Warning);
        assert_eq!(notice.text, "Can't send empty message");
    }

    #[tokio::test]
    async fn test_embed_with_only_color_is_refused() {
        let composer = composer();
        composer.drafts().update(&SESSION, |draft| draft.set_color("success"));
        let mut sink = MockSendSink::new();
        sink.expect_send().never();

        let panel = surface(run(&composer, ComposerAction::Send, &sink).await);
        assert_eq!(panel.notice.unwrap().tone, Tone::Warning);
    }

    #[tokio::test]
    async fn test_enabled_empty_embed_is_refused_and_draft_untouched() {
        let composer = composer();
        composer.drafts().update(&SESSION, |draft| draft.set_embed_enabled(true));
        let before = composer.drafts().get(&SESSION).unwrap();
        let mut sink = MockSendSink::new();
        sink.expect_send().never();

        let panel = surface(run(&composer, ComposerAction::Send, &sink).await);
        let notice = panel.notice.unwrap();
        assert_eq!(notice.tone, Tone::Warning);
        assert_eq!(notice.text, "Can't send empty message");
        assert_eq!(composer.drafts().get(&SESSION).unwrap(), before);
    }

    #[tokio::test]
    async fn test_send_delivers_once_and_keeps_draft() {
        let composer = composer();
        let mut sink = MockSendSink::new();
        sink.expect_send()
            .times(1)
            .withf(|message| message.content.as_deref() == Some("hello") && message.embed.is_none())
            .returning(|_| Ok(()));

        let action = ComposerAction::Submit(DraftField::Content, values(&[("content", "hello")]));
        run(&composer, action, &sink).await;
        let before = composer.drafts().get(&SESSION).unwrap();

        let panel = surface(run(&composer, ComposerAction::Send, &sink).await);
        assert_eq!(panel.notice.unwrap().tone, Tone::Success);
        assert_eq!(composer.drafts().get(&SESSION).unwrap(), before);
    }

    #[tokio::test]
    async fn test_send_failure_reports_warning() {
        let composer = composer();
        composer.drafts().update(&SESSION, |draft| draft.set_content("hello"));
        let mut sink = MockSendSink::new();
        sink.expect_send()
            .times(1)
            .returning(|_| Err(EditorError::Delivery("Missing Permissions".to_string())));

        let panel = surface(run(&composer, ComposerAction::Send, &sink).await);
        let notice = panel.notice.unwrap();
        assert_eq!(notice.tone, Tone::Warning);
        assert!(notice.text.contains("Missing Permissions"));
        assert!(composer.drafts().contains(&SESSION));
    }

    #[tokio::test]
    async fn test_cancel_then_open_starts_fresh() {
        let composer = composer();
        composer.drafts().update(&SESSION, |draft| draft.set_content("old"));
        let old_id = composer.drafts().get(&SESSION).unwrap().id;
        let sink = MockSendSink::new();

        let reply = run(&composer, ComposerAction::Cancel, &sink).await;
        assert!(matches!(reply, EditorReply::Closed(_)));
        assert!(!composer.drafts().contains(&SESSION));

        run(&composer, ComposerAction::Open, &sink).await;
        let fresh = composer.drafts().get(&SESSION).unwrap();
        assert_ne!(fresh.id, old_id);
        assert!(fresh.is_empty());
    }

    #[tokio::test]
    async fn test_reset_clears_fields() {
        let composer = composer();
        composer.drafts().update(&SESSION, |draft| draft.set_footer("f", None));
        let sink = MockSendSink::new();

        let panel = surface(run(&composer, ComposerAction::Reset, &sink).await);
        assert_eq!(panel.toggle("footer").unwrap().style, ToggleStyle::Empty);
        assert!(composer.drafts().get(&SESSION).unwrap().is_empty());
    }
}
