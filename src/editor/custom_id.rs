//! Component identifiers
//!
//! Buttons, selects, inputs and modals carry a custom id that routes the
//! resulting interaction back to its handler and session. Ids are kept as a
//! [`ComponentId`] inside the bot and only become strings at the Discord
//! boundary: `"{scope}-{session}-{field}-{kind}"`.

use crate::editor::CustomIdError;
use derive_more::Display;
use std::str::FromStr;

/// Separator between the four parts of a serialized id
pub const DELIMITER: char = '-';

/// Discord's limit on custom id length
pub const CUSTOM_ID_MAX_LENGTH: usize = 100;

/// Which workflow owns a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Scope {
    /// The `/message` composer
    #[display("message")]
    Message,
    /// Guild settings panels (welcome)
    #[display("settings")]
    Settings,
}

impl FromStr for Scope {
    type Err = CustomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(Self::Message),
            "settings" => Ok(Self::Settings),
            other => Err(CustomIdError::UnknownScope(other.to_string())),
        }
    }
}

/// What kind of component an id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ComponentKind {
    #[display("button")]
    Button,
    #[display("input")]
    Input,
    #[display("select")]
    Select,
    #[display("modal")]
    Modal,
}

impl FromStr for ComponentKind {
    type Err = CustomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "button" => Ok(Self::Button),
            "input" => Ok(Self::Input),
            "select" => Ok(Self::Select),
            "modal" => Ok(Self::Modal),
            other => Err(CustomIdError::UnknownKind(other.to_string())),
        }
    }
}

/// Key of an editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// One user's session inside one guild
    Member { user_id: u64, guild_id: u64 },
    /// Guild-wide settings session
    Guild { guild_id: u64 },
}

impl SessionKey {
    #[must_use]
    pub const fn member(user_id: u64, guild_id: u64) -> Self {
        Self::Member { user_id, guild_id }
    }

    #[must_use]
    pub const fn guild(guild_id: u64) -> Self {
        Self::Guild { guild_id }
    }

    #[must_use]
    pub const fn guild_id(&self) -> u64 {
        match self {
            Self::Member { guild_id, .. } | Self::Guild { guild_id } => *guild_id,
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member { user_id, guild_id } => write!(f, "{user_id}.{guild_id}"),
            Self::Guild { guild_id } => write!(f, "{guild_id}"),
        }
    }
}

impl FromStr for SessionKey {
    type Err = CustomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CustomIdError::InvalidSession(s.to_string());
        match s.split_once('.') {
            Some((user, guild)) => Ok(Self::Member {
                user_id: user.parse().map_err(|_| invalid())?,
                guild_id: guild.parse().map_err(|_| invalid())?,
            }),
            None => Ok(Self::Guild {
                guild_id: s.parse().map_err(|_| invalid())?,
            }),
        }
    }
}

/// Structured custom id of a component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentId {
    pub scope: Scope,
    pub session: SessionKey,
    /// Handler specific field name, never contains the delimiter
    pub field: String,
    pub kind: ComponentKind,
}

impl ComponentId {
    #[must_use]
    pub fn new(scope: Scope, session: SessionKey, field: impl Into<String>, kind: ComponentKind) -> Self {
        let field = field.into();
        debug_assert!(
            !field.is_empty() && !field.contains(DELIMITER),
            "invalid component field: {field}"
        );
        Self {
            scope,
            session,
            field,
            kind,
        }
    }

    /// Same scope and session, different field and kind
    #[must_use]
    pub fn sibling(&self, field: impl Into<String>, kind: ComponentKind) -> Self {
        Self::new(self.scope, self.session, field, kind)
    }

    /// Parse a serialized id.
    ///
    /// # Errors
    ///
    /// Returns a [`CustomIdError`] describing the first malformed part.
    pub fn parse(raw: &str) -> Result<Self, CustomIdError> {
        raw.parse()
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}",
            self.scope, self.session, self.field, self.kind
        )
    }
}

impl FromStr for ComponentId {
    type Err = CustomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(DELIMITER).collect();
        let [scope, session, field, kind] = parts.as_slice() else {
            return Err(CustomIdError::PartCount(parts.len()));
        };
        if field.is_empty() {
            return Err(CustomIdError::EmptyField);
        }

        Ok(Self {
            scope: scope.parse()?,
            session: session.parse()?,
            field: (*field).to_string(),
            kind: kind.parse()?,
        })
    }
}

impl From<ComponentId> for String {
    fn from(id: ComponentId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_form() {
        let id = ComponentId::new(
            Scope::Message,
            SessionKey::member(111, 222),
            "title",
            ComponentKind::Button,
        );
        assert_eq!(id.to_string(), "message-111.222-title-button");

        let id = ComponentId::new(
            Scope::Settings,
            SessionKey::guild(222),
            "welcome.join.author",
            ComponentKind::Modal,
        );
        assert_eq!(id.to_string(), "settings-222-welcome.join.author-modal");
    }

    #[test]
    fn test_parse_valid_ids() {
        let id = ComponentId::parse("message-111.222-send-button").unwrap();
        assert_eq!(id.scope, Scope::Message);
        assert_eq!(id.session, SessionKey::member(111, 222));
        assert_eq!(id.field, "send");
        assert_eq!(id.kind, ComponentKind::Button);

        let id = ComponentId::parse("settings-222-welcome.channel-select").unwrap();
        assert_eq!(id.session, SessionKey::guild(222));
        assert_eq!(id.kind, ComponentKind::Select);
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        assert_eq!(
            ComponentId::parse("message-111.222-send"),
            Err(CustomIdError::PartCount(3))
        );
        assert_eq!(
            ComponentId::parse("message-111.222-send-button-extra"),
            Err(CustomIdError::PartCount(5))
        );
        assert_eq!(
            ComponentId::parse("warn-111.222-send-button"),
            Err(CustomIdError::UnknownScope("warn".to_string()))
        );
        assert_eq!(
            ComponentId::parse("message-abc-send-button"),
            Err(CustomIdError::InvalidSession("abc".to_string()))
        );
        assert_eq!(
            ComponentId::parse("message-1.x-send-button"),
            Err(CustomIdError::InvalidSession("1.x".to_string()))
        );
        assert_eq!(
            ComponentId::parse("message-111.222--button"),
            Err(CustomIdError::EmptyField)
        );
        assert_eq!(
            ComponentId::parse("message-111.222-send-Button"),
            Err(CustomIdError::UnknownKind("Button".to_string()))
        );
    }

    #[test]
    fn test_sibling_keeps_session() {
        let id = ComponentId::new(
            Scope::Message,
            SessionKey::member(1, 2),
            "title",
            ComponentKind::Button,
        );
        let modal = id.sibling("title", ComponentKind::Modal);
        assert_eq!(modal.session, id.session);
        assert_eq!(modal.to_string(), "message-1.2-title-modal");
    }

    #[test]
    fn test_longest_id_fits_discord_limit() {
        let id = ComponentId::new(
            Scope::Settings,
            SessionKey::member(u64::MAX, u64::MAX),
            "welcome.leave.footer.image",
            ComponentKind::Select,
        );
        assert!(id.to_string().len() <= CUSTOM_ID_MAX_LENGTH);
    }

    #[test]
    fn test_session_guild_id() {
        assert_eq!(SessionKey::member(1, 2).guild_id(), 2);
        assert_eq!(SessionKey::guild(3).guild_id(), 3);
    }
}
