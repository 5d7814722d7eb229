//! Welcome settings panel
//!
//! A guild-wide working copy of [`WelcomeSettings`] edited through components
//! of the `settings` scope. Nothing reaches the persisted configuration until
//! the panel is saved.

use crate::INTERACTION_TARGET;
use crate::editor::{
    CustomIdError, DraftStore,
    custom_id::{ComponentId, ComponentKind, Scope, SessionKey},
    surface::{
        ControlRow, ControlSurface, DraftField, EMBED_FIELD, EditorReply, InputField,
        InputStyle, InputSurface, ModalValues, Notice, Toggle, ToggleStyle,
    },
};
use crate::welcome::{
    settings::{WelcomeKind, WelcomeSettings},
    variables::member_variable_help,
};
use async_trait::async_trait;
use tracing::{info, warn};

/// Root field of every welcome component
pub const WELCOME_FIELD: &str = "welcome";
/// Discord's webhook name limit
pub const WEBHOOK_NAME_MAX_LENGTH: u16 = 80;

const PANEL_TITLE: &str = "Welcome settings";

/// Where persisted welcome settings live
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WelcomeRepository: Send + Sync {
    /// Persisted settings, default when the guild has none
    async fn load(&self, guild_id: u64) -> WelcomeSettings;

    /// Persist `settings` for the guild
    async fn store(&self, guild_id: u64, settings: WelcomeSettings) -> Result<(), crate::Error>;
}

/// Payload an interaction carried besides its custom id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Submission {
    #[default]
    None,
    Modal(ModalValues),
    Channels(Vec<u64>),
}

/// Something the user asked the welcome panel to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WelcomeAction {
    /// Show the main panel
    Open,
    Toggle,
    SelectChannel(Option<u64>),
    EditWebhook,
    SubmitWebhook(ModalValues),
    /// Show the editor of the join or leave message
    OpenMessage(WelcomeKind),
    EditMessage(WelcomeKind, DraftField),
    SubmitMessage(WelcomeKind, DraftField, ModalValues),
    ResetMessage(WelcomeKind),
    /// Switch the embed of the join or leave message on or off
    ToggleEmbed(WelcomeKind),
    Save,
    Restore,
}

impl WelcomeAction {
    /// Route a component interaction of the settings scope.
    ///
    /// # Errors
    ///
    /// Returns [`CustomIdError::UnknownField`] when the field isn't one the
    /// panel issues.
    pub fn from_component(id: &ComponentId, submission: Submission) -> Result<Self, CustomIdError> {
        let unknown = || CustomIdError::UnknownField {
            scope: id.scope.to_string(),
            field: id.field.clone(),
        };
        let values = |submission: Submission| match submission {
            Submission::Modal(values) => values,
            _ => ModalValues::new(),
        };
        let kind = |name: &str| WelcomeKind::from_name(name).ok_or_else(unknown);
        let field = |name: &str| name.parse::<DraftField>().map_err(|_| unknown());

        let parts: Vec<&str> = id.field.split('.').collect();
        let [WELCOME_FIELD, rest @ ..] = parts.as_slice() else {
            return Err(unknown());
        };

        let action = match (id.kind, rest) {
            (ComponentKind::Button, []) => Self::Open,
            (ComponentKind::Button, ["toggle"]) => Self::Toggle,
            (ComponentKind::Select, ["channel"]) => match submission {
                Submission::Channels(channels) => Self::SelectChannel(channels.first().copied()),
                _ => Self::SelectChannel(None),
            },
            (ComponentKind::Button, ["webhook"]) => Self::EditWebhook,
            (ComponentKind::Modal, ["webhook"]) => Self::SubmitWebhook(values(submission)),
            (ComponentKind::Button, ["save"]) => Self::Save,
            (ComponentKind::Button, ["restore"]) => Self::Restore,
            (ComponentKind::Button, [name]) => Self::OpenMessage(kind(*name)?),
            (ComponentKind::Button, [name, "reset"]) => Self::ResetMessage(kind(*name)?),
            (ComponentKind::Button, [name, EMBED_FIELD]) => Self::ToggleEmbed(kind(*name)?),
            (ComponentKind::Button, [name, draft_field]) => {
                Self::EditMessage(kind(*name)?, field(*draft_field)?)
            }
            (ComponentKind::Modal, [name, draft_field]) => {
                Self::SubmitMessage(kind(*name)?, field(*draft_field)?, values(submission))
            }
            _ => return Err(unknown()),
        };
        Ok(action)
    }
}

/// The welcome settings editor
#[derive(Debug, Clone)]
pub struct WelcomePanel {
    drafts: DraftStore<WelcomeSettings>,
}

impl WelcomePanel {
    #[must_use]
    pub fn new(drafts: DraftStore<WelcomeSettings>) -> Self {
        Self { drafts }
    }

    #[must_use]
    pub fn drafts(&self) -> &DraftStore<WelcomeSettings> {
        &self.drafts
    }

    /// Working copy for the guild, seeded from the persisted settings
    async fn working_copy(&self, key: SessionKey, repo: &dyn WelcomeRepository) -> WelcomeSettings {
        if let Some(settings) = self.drafts.get(&key) {
            return settings;
        }
        let persisted = repo.load(key.guild_id()).await;
        self.drafts.get_or_insert(&key, persisted)
    }

    async fn modify(
        &self,
        key: SessionKey,
        repo: &dyn WelcomeRepository,
        f: impl FnOnce(&mut WelcomeSettings),
    ) -> WelcomeSettings {
        self.working_copy(key, repo).await;
        self.drafts.update(&key, f)
    }

    /// Handle one action for the guild's panel
    pub async fn handle(
        &self,
        guild_id: u64,
        action: WelcomeAction,
        repo: &dyn WelcomeRepository,
    ) -> EditorReply {
        let key = SessionKey::guild(guild_id);
        match action {
            WelcomeAction::Open => {
                let settings = self.working_copy(key, repo).await;
                EditorReply::Surface(panel_surface(key, &settings))
            }
            WelcomeAction::Toggle => {
                let settings = self
                    .modify(key, repo, |settings| settings.enabled = !settings.enabled)
                    .await;
                EditorReply::Surface(panel_surface(key, &settings))
            }
            WelcomeAction::SelectChannel(channel) => {
                let settings = self
                    .modify(key, repo, |settings| {
                        if let Some(channel) = channel {
                            settings.set_channel(channel);
                        }
                    })
                    .await;
                EditorReply::Surface(panel_surface(key, &settings))
            }
            WelcomeAction::EditWebhook => {
                let settings = self.working_copy(key, repo).await;
                EditorReply::Prompt(webhook_surface(key, &settings))
            }
            WelcomeAction::SubmitWebhook(values) => {
                let settings = self
                    .modify(key, repo, |settings| {
                        settings.set_webhook(values.get("name"), values.get("avatar"));
                    })
                    .await;
                EditorReply::Surface(panel_surface(key, &settings))
            }
            WelcomeAction::OpenMessage(kind) => {
                let settings = self.working_copy(key, repo).await;
                EditorReply::Surface(message_surface(key, kind, &settings))
            }
            WelcomeAction::EditMessage(kind, field) => {
                let settings = self.working_copy(key, repo).await;
                let modal = welcome_id(key, &format!("{kind}.{}", field.as_str()), ComponentKind::Modal);
                EditorReply::Prompt(field.input_surface(
                    settings.message(kind),
                    modal,
                    kind.label(),
                ))
            }
            WelcomeAction::SubmitMessage(kind, field, values) => {
                let settings = self
                    .modify(key, repo, |settings| {
                        field.apply(settings.message_mut(kind), &values);
                    })
                    .await;
                EditorReply::Surface(message_surface(key, kind, &settings))
            }
            WelcomeAction::ResetMessage(kind) => {
                let settings = self
                    .modify(key, repo, |settings| {
                        *settings.message_mut(kind) = crate::editor::Draft::new();
                    })
                    .await;
                EditorReply::Surface(message_surface(key, kind, &settings))
            }
            WelcomeAction::ToggleEmbed(kind) => {
                let settings = self
                    .modify(key, repo, |settings| {
                        let draft = settings.message_mut(kind);
                        draft.set_embed_enabled(!draft.embed_enabled);
                    })
                    .await;
                EditorReply::Surface(message_surface(key, kind, &settings))
            }
            WelcomeAction::Save => {
                let settings = self.working_copy(key, repo).await;
                let notice = match repo.store(guild_id, settings.clone()).await {
                    Ok(()) => {
                        info!(target: INTERACTION_TARGET, guild_id, "Welcome settings saved");
                        Notice::success("Saved", "Welcome settings were saved")
                    }
                    Err(e) => {
                        warn!(target: INTERACTION_TARGET, guild_id, "Failed to save welcome settings: {e}");
                        Notice::warning("Warning", format!("Failed to save settings: {e}"))
                    }
                };
                EditorReply::Surface(panel_surface(key, &settings).with_notice(Some(notice)))
            }
            WelcomeAction::Restore => {
                let settings = repo.load(guild_id).await;
                self.drafts.insert(key, settings.clone());
                info!(target: INTERACTION_TARGET, guild_id, "Welcome settings restored");
                EditorReply::Surface(panel_surface(key, &settings).with_notice(Some(
                    Notice::success("Restored", "Unsaved changes were discarded"),
                )))
            }
        }
    }
}

fn welcome_id(key: SessionKey, rest: &str, kind: ComponentKind) -> ComponentId {
    let field = if rest.is_empty() {
        WELCOME_FIELD.to_string()
    } else {
        format!("{WELCOME_FIELD}.{rest}")
    };
    ComponentId::new(Scope::Settings, key, field, kind)
}

/// Main panel of the guild's welcome settings
#[must_use]
pub fn panel_surface(key: SessionKey, settings: &WelcomeSettings) -> ControlSurface {
    let button = |rest: &str, label: &str, style: ToggleStyle| {
        Toggle::new(welcome_id(key, rest, ComponentKind::Button), label, style)
    };
    let channel = settings
        .channel_id
        .map_or_else(|| "Not set".to_string(), |id| format!("<#{id}>"));
    let webhook = settings
        .webhook_name
        .clone()
        .unwrap_or_else(|| crate::BOT_NAME.to_string());

    ControlSurface {
        title: PANEL_TITLE.to_string(),
        description: "Greet members who join and say goodbye to those who leave. \
                      Changes apply once saved."
            .to_string(),
        fields: vec![
            (
                "Status".to_string(),
                if settings.enabled { "Enabled" } else { "Disabled" }.to_string(),
            ),
            ("Channel".to_string(), channel),
            ("Webhook".to_string(), webhook),
        ],
        rows: vec![
            ControlRow::ChannelSelect {
                id: welcome_id(key, "channel", ComponentKind::Select),
                placeholder: "Select welcome channel".to_string(),
                current: settings.channel_id,
            },
            ControlRow::Buttons(vec![
                button(
                    "toggle",
                    if settings.enabled { "Enabled" } else { "Disabled" },
                    ToggleStyle::reflecting(settings.enabled),
                ),
                button(
                    "webhook",
                    "Webhook",
                    ToggleStyle::reflecting(
                        settings.webhook_name.is_some() || settings.webhook_avatar.is_some(),
                    ),
                ),
                button(
                    "join",
                    WelcomeKind::Join.label(),
                    ToggleStyle::reflecting(!settings.join.is_empty()),
                ),
                button(
                    "leave",
                    WelcomeKind::Leave.label(),
                    ToggleStyle::reflecting(!settings.leave.is_empty()),
                ),
            ]),
            ControlRow::Buttons(vec![
                button("save", "Save", ToggleStyle::Confirm),
                button("restore", "Restore", ToggleStyle::Danger),
            ]),
        ],
        notice: None,
    }
}

/// Editor of the join or leave message
#[must_use]
pub fn message_surface(key: SessionKey, kind: WelcomeKind, settings: &WelcomeSettings) -> ControlSurface {
    let draft = settings.message(kind);
    let toggle = |field: DraftField| {
        Toggle::new(
            welcome_id(key, &format!("{kind}.{}", field.as_str()), ComponentKind::Button),
            field.label(),
            ToggleStyle::reflecting(field.is_populated(draft)),
        )
    };

    ControlSurface {
        title: kind.label().to_string(),
        description: member_variable_help(),
        fields: Vec::new(),
        rows: vec![
            ControlRow::Buttons(vec![
                Toggle::embed_switch(
                    welcome_id(key, &format!("{kind}.{EMBED_FIELD}"), ComponentKind::Button),
                    draft,
                ),
                toggle(DraftField::Settings),
                toggle(DraftField::Title),
                toggle(DraftField::Author),
                toggle(DraftField::Footer),
            ]),
            ControlRow::Buttons(vec![
                Toggle::new(
                    welcome_id(key, "", ComponentKind::Button),
                    "Back",
                    ToggleStyle::Neutral,
                ),
                Toggle::new(
                    welcome_id(key, &format!("{kind}.reset"), ComponentKind::Button),
                    "Reset",
                    ToggleStyle::Danger,
                ),
                toggle(DraftField::Content),
            ]),
        ],
        notice: None,
    }
}

/// Modal editing the webhook name and avatar
#[must_use]
pub fn webhook_surface(key: SessionKey, settings: &WelcomeSettings) -> InputSurface {
    let modal = welcome_id(key, "webhook", ComponentKind::Modal);
    InputSurface {
        title: "Welcome webhook".to_string(),
        inputs: vec![
            InputField {
                id: modal.sibling("name", ComponentKind::Input),
                label: "Webhook name".to_string(),
                style: InputStyle::Short,
                value: settings.webhook_name.clone().unwrap_or_default(),
                placeholder: "Enter webhook name".to_string(),
                required: false,
                max_length: WEBHOOK_NAME_MAX_LENGTH,
            },
            InputField {
                id: modal.sibling("avatar", ComponentKind::Input),
                label: "Webhook avatar".to_string(),
                style: InputStyle::Short,
                value: settings.webhook_avatar.clone().unwrap_or_default(),
                placeholder: "Enter image URL or server, client".to_string(),
                required: false,
                max_length: crate::editor::surface::SHORT_MAX_LENGTH,
            },
        ],
        id: modal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::store::EvictionPolicy;
    use mockall::predicate::eq;

    const GUILD: u64 = 500;

    fn panel() -> WelcomePanel {
        WelcomePanel::new(DraftStore::new("welcome", EvictionPolicy::unbounded()))
    }

    fn id(field: &str, kind: ComponentKind) -> ComponentId {
        ComponentId::new(Scope::Settings, SessionKey::guild(GUILD), field, kind)
    }

    fn repo_with(settings: WelcomeSettings) -> MockWelcomeRepository {
        let mut repo = MockWelcomeRepository::new();
        repo.expect_load()
            .returning(move |_| settings.clone());
        repo
    }

    fn surface(reply: EditorReply) -> ControlSurface {
        match reply {
            EditorReply::Surface(surface) => surface,
            other => panic!("expected a control surface, got {other:?}"),
        }
    }

    #[test]
    fn test_routing() {
        let route = |field: &str, kind| WelcomeAction::from_component(&id(field, kind), Submission::None);

        assert_eq!(route("welcome", ComponentKind::Button).unwrap(), WelcomeAction::Open);
        assert_eq!(
            route("welcome.toggle", ComponentKind::Button).unwrap(),
            WelcomeAction::Toggle
        );
        assert_eq!(
            route("welcome.join", ComponentKind::Button).unwrap(),
            WelcomeAction::OpenMessage(WelcomeKind::Join)
        );
        assert_eq!(
            route("welcome.leave.title", ComponentKind::Button).unwrap(),
            WelcomeAction::EditMessage(WelcomeKind::Leave, DraftField::Title)
        );
        assert_eq!(
            route("welcome.leave.reset", ComponentKind::Button).unwrap(),
            WelcomeAction::ResetMessage(WelcomeKind::Leave)
        );
        assert_eq!(
            route("welcome.join.embed", ComponentKind::Button).unwrap(),
            WelcomeAction::ToggleEmbed(WelcomeKind::Join)
        );
        assert!(route("welcome.party", ComponentKind::Button).is_err());
        assert!(route("welcome.join.bogus", ComponentKind::Button).is_err());
        assert!(route("other", ComponentKind::Button).is_err());

        let channel = WelcomeAction::from_component(
            &id("welcome.channel", ComponentKind::Select),
            Submission::Channels(vec![42]),
        );
        assert_eq!(channel.unwrap(), WelcomeAction::SelectChannel(Some(42)));
    }

    #[test]
    fn test_panel_ids_route_back() {
        let key = SessionKey::guild(GUILD);
        let settings = WelcomeSettings::default();
        let surfaces = [
            panel_surface(key, &settings),
            message_surface(key, WelcomeKind::Join, &settings),
        ];
        for toggle in surfaces.iter().flat_map(ControlSurface::toggles) {
            assert!(
                WelcomeAction::from_component(&toggle.id, Submission::None).is_ok(),
                "{} does not route",
                toggle.id
            );
        }
    }

    #[tokio::test]
    async fn test_open_seeds_working_copy_once() {
        let panel = panel();
        let mut repo = MockWelcomeRepository::new();
        repo.expect_load()
            .with(eq(GUILD))
            .times(1)
            .returning(|_| WelcomeSettings {
                enabled: true,
                ..Default::default()
            });

        panel.handle(GUILD, WelcomeAction::Open, &repo).await;
        let panel_view = surface(panel.handle(GUILD, WelcomeAction::Open, &repo).await);
        assert_eq!(panel_view.toggle("welcome.toggle").unwrap().style, ToggleStyle::Filled);
    }

    #[tokio::test]
    async fn test_edits_stay_unsaved_until_save() {
        let panel = panel();
        let mut repo = repo_with(WelcomeSettings::default());
        repo.expect_store().never();

        panel.handle(GUILD, WelcomeAction::Toggle, &repo).await;
        panel
            .handle(GUILD, WelcomeAction::SelectChannel(Some(77)), &repo)
            .await;

        let working = panel.drafts().get(&SessionKey::guild(GUILD)).unwrap();
        assert!(working.enabled);
        assert_eq!(working.channel_id, Some(77));
    }

    /// Repository that yields before answering, like a real storage backend
    struct YieldingRepository;

    #[async_trait]
    impl WelcomeRepository for YieldingRepository {
        async fn load(&self, _guild_id: u64) -> WelcomeSettings {
            tokio::task::yield_now().await;
            WelcomeSettings::default()
        }

        async fn store(&self, _guild_id: u64, _settings: WelcomeSettings) -> Result<(), crate::Error> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_concurrent_first_edits_both_survive() {
        let panel = panel();
        let repo = YieldingRepository;

        tokio::join!(
            panel.handle(GUILD, WelcomeAction::Toggle, &repo),
            panel.handle(GUILD, WelcomeAction::SelectChannel(Some(77)), &repo),
        );

        let working = panel.drafts().get(&SessionKey::guild(GUILD)).unwrap();
        assert!(working.enabled);
        assert_eq!(working.channel_id, Some(77));
    }

    #[tokio::test]
    async fn test_save_persists_working_copy() {
        let panel = panel();
        let mut repo = repo_with(WelcomeSettings::default());
        repo.expect_store()
            .withf(|guild_id, settings| {
                *guild_id == GUILD && settings.join.content.as_deref() == Some("Hi {{user mention}}")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let values: ModalValues = [("content", "Hi {{user mention}}")].into_iter().collect();
        let action = WelcomeAction::SubmitMessage(WelcomeKind::Join, DraftField::Content, values);
        let editor = surface(panel.handle(GUILD, action, &repo).await);
        assert_eq!(
            editor.toggle("welcome.join.content").unwrap().style,
            ToggleStyle::Filled
        );

        let saved = surface(panel.handle(GUILD, WelcomeAction::Save, &repo).await);
        assert_eq!(saved.notice.unwrap().title, "Saved");
    }

    #[tokio::test]
    async fn test_failed_save_warns_and_keeps_working_copy() {
        let panel = panel();
        let mut repo = repo_with(WelcomeSettings::default());
        repo.expect_store()
            .returning(|_, _| Err("disk full".into()));

        panel.handle(GUILD, WelcomeAction::Toggle, &repo).await;
        let reply = surface(panel.handle(GUILD, WelcomeAction::Save, &repo).await);
        assert!(reply.notice.unwrap().text.contains("disk full"));
        assert!(panel.drafts().get(&SessionKey::guild(GUILD)).unwrap().enabled);
    }

    #[tokio::test]
    async fn test_restore_discards_changes() {
        let panel = panel();
        let repo = repo_with(WelcomeSettings::default());

        panel.handle(GUILD, WelcomeAction::Toggle, &repo).await;
        panel.handle(GUILD, WelcomeAction::Restore, &repo).await;
        assert!(!panel.drafts().get(&SessionKey::guild(GUILD)).unwrap().enabled);
    }

    #[tokio::test]
    async fn test_webhook_modal_blank_keeps_values() {
        let panel = panel();
        let repo = repo_with(WelcomeSettings {
            webhook_name: Some("Greeter".to_string()),
            ..Default::default()
        });

        let prompt = panel.handle(GUILD, WelcomeAction::EditWebhook, &repo).await;
        let EditorReply::Prompt(modal) = prompt else {
            panic!("expected a modal");
        };
        assert_eq!(modal.inputs[0].value, "Greeter");

        let values: ModalValues = [("name", ""), ("avatar", "server")].into_iter().collect();
        panel
            .handle(GUILD, WelcomeAction::SubmitWebhook(values), &repo)
            .await;
        let working = panel.drafts().get(&SessionKey::guild(GUILD)).unwrap();
        assert_eq!(working.webhook_name.as_deref(), Some("Greeter"));
        assert_eq!(working.webhook_avatar.as_deref(), Some("server"));
    }

    #[tokio::test]
    async fn test_embed_switch_turns_message_embed_off() {
        let panel = panel();
        let mut settings = WelcomeSettings::default();
        settings.leave.set_description("Goodbye {{user name}}");
        let repo = repo_with(settings);

        let editor = surface(
            panel
                .handle(GUILD, WelcomeAction::OpenMessage(WelcomeKind::Leave), &repo)
                .await,
        );
        assert_eq!(editor.toggle("welcome.leave.embed").unwrap().style, ToggleStyle::Filled);

        let editor = surface(
            panel
                .handle(GUILD, WelcomeAction::ToggleEmbed(WelcomeKind::Leave), &repo)
                .await,
        );
        assert_eq!(editor.toggle("welcome.leave.embed").unwrap().style, ToggleStyle::Empty);
        let working = panel.drafts().get(&SessionKey::guild(GUILD)).unwrap();
        assert!(!working.leave.embed_enabled);
        assert_eq!(working.leave.description.as_deref(), Some("Goodbye {{user name}}"));
        assert!(!working.join.embed_enabled);
    }

    #[tokio::test]
    async fn test_reset_message_only_touches_that_kind() {
        let panel = panel();
        let mut settings = WelcomeSettings::default();
        settings.join.set_content("hello");
        settings.leave.set_content("bye");
        let repo = repo_with(settings);

        panel
            .handle(GUILD, WelcomeAction::ResetMessage(WelcomeKind::Join), &repo)
            .await;
        let working = panel.drafts().get(&SessionKey::guild(GUILD)).unwrap();
        assert!(working.join.is_empty());
        assert_eq!(working.leave.content.as_deref(), Some("bye"));
    }
}
