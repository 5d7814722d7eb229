use crate::editor::Draft;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Which member event a welcome message answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WelcomeKind {
    #[display("join")]
    Join,
    #[display("leave")]
    Leave,
}

impl WelcomeKind {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "join" => Some(Self::Join),
            "leave" => Some(Self::Leave),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Join => "Join message",
            Self::Leave => "Leave message",
        }
    }
}

/// Per-guild welcome configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WelcomeSettings {
    pub enabled: bool,
    pub channel_id: Option<u64>,
    /// Webhook created on first delivery
    pub webhook_id: Option<u64>,
    pub webhook_name: Option<String>,
    /// Image URL or `server`/`client` token
    pub webhook_avatar: Option<String>,
    pub join: Draft,
    pub leave: Draft,
}

impl WelcomeSettings {
    #[must_use]
    pub const fn message(&self, kind: WelcomeKind) -> &Draft {
        match kind {
            WelcomeKind::Join => &self.join,
            WelcomeKind::Leave => &self.leave,
        }
    }

    pub fn message_mut(&mut self, kind: WelcomeKind) -> &mut Draft {
        match kind {
            WelcomeKind::Join => &mut self.join,
            WelcomeKind::Leave => &mut self.leave,
        }
    }

    /// Set webhook name and avatar; blank values keep the current ones
    pub fn set_webhook(&mut self, name: &str, avatar: &str) {
        if !name.trim().is_empty() {
            self.webhook_name = Some(name.trim().to_string());
        }
        if !avatar.trim().is_empty() {
            self.webhook_avatar = Some(avatar.trim().to_string());
        }
    }

    /// Channel changed since the webhook was created
    pub fn set_channel(&mut self, channel_id: u64) {
        if self.channel_id != Some(channel_id) {
            self.channel_id = Some(channel_id);
            self.webhook_id = None;
        }
    }
}
