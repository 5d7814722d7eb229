//! `{{variable}}` substitution for welcome messages

use chrono::{DateTime, Utc};

/// Shown for dates Discord didn't tell us
pub const UNSPECIFIED: &str = "Unspecified";

/// Guild facts available to welcome messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildFacts {
    pub name: String,
    pub icon: Option<String>,
    pub members: u64,
    pub created: DateTime<Utc>,
}

/// User facts available to welcome messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacts {
    pub id: u64,
    pub name: String,
    pub avatar: String,
    pub created: DateTime<Utc>,
    /// When the user joined the guild, if known
    pub joined: Option<DateTime<Utc>>,
}

/// Name to value table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables(Vec<(String, String)>);

fn relative(at: DateTime<Utc>) -> String {
    format!("<t:{}:R>", at.timestamp())
}

fn short_date(at: DateTime<Utc>) -> String {
    format!("<t:{}:d>", at.timestamp())
}

impl Variables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `{{name}}`
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.push((name.to_string(), value.into()));
        self
    }

    /// Variables for a member event
    #[must_use]
    pub fn for_member(guild: &GuildFacts, user: &UserFacts, client: &UserFacts) -> Self {
        let joined = |render: fn(DateTime<Utc>) -> String| {
            user.joined.map_or_else(|| UNSPECIFIED.to_string(), render)
        };
        Self::new()
            .with("user name", &user.name)
            .with("user mention", format!("<@{}>", user.id))
            .with("user avatar", &user.avatar)
            .with("user created", relative(user.created))
            .with("user created at", short_date(user.created))
            .with("user joined", joined(relative))
            .with("user joined at", joined(short_date))
            .with("guild name", &guild.name)
            .with("guild icon", guild.icon.clone().unwrap_or_default())
            .with("guild members", guild.members.to_string())
            .with("guild created", relative(guild.created))
            .with("guild created at", short_date(guild.created))
            .with("client name", &client.name)
            .with("client avatar", &client.avatar)
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(known, _)| known == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace every known placeholder in one pass; unknown ones stay as
    /// typed and substituted values are never expanded again
    #[must_use]
    pub fn format(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];
            let Some(close) = after_open.find("}}") else {
                rest = &rest[open..];
                break;
            };
            match self.lookup(&after_open[..close]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after_open[close + 2..];
                }
                None => {
                    // retry from the next brace so `{{{{name}}` still matches
                    out.push('{');
                    rest = &rest[open + 1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Placeholders, for help text
    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        self.0.iter().map(|(name, _)| format!("{{{{{name}}}}}"))
    }
}

/// Help line listing every member variable
#[must_use]
pub fn member_variable_help() -> String {
    let guild = GuildFacts {
        name: String::new(),
        icon: None,
        members: 0,
        created: DateTime::<Utc>::default(),
    };
    let user = UserFacts {
        id: 0,
        name: String::new(),
        avatar: String::new(),
        created: DateTime::<Utc>::default(),
        joined: None,
    };
    let vars = Variables::for_member(&guild, &user, &user);
    let names: Vec<String> = vars.names().collect();
    format!("Variables: {}", names.join(", "))
}
