//! Symbolic image references
//!
//! Drafts keep whatever the user typed for icons and images. The tokens
//! `server`, `user` and `client` are only turned into URLs when a draft is
//! rendered, through an [`ImageResolver`].

/// Parsed form of a stored image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef<'a> {
    /// The guild icon
    Server,
    /// The avatar of the interacting (or joining) user
    User,
    /// The bot's own avatar
    Client,
    /// Anything else, passed through as a URL
    Url(&'a str),
}

impl<'a> ImageRef<'a> {
    /// Parse a stored reference
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "server" | "guild" => Self::Server,
            "user" => Self::User,
            "client" | "bot" => Self::Client,
            _ => Self::Url(raw),
        }
    }
}

/// Resolves stored image references to concrete URLs
pub trait ImageResolver: Send + Sync {
    /// URL for a reference, or `None` when it can't be resolved
    fn resolve(&self, raw: &str) -> Option<String>;
}

/// Image URLs known at render time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageContext {
    pub server: Option<String>,
    pub user: Option<String>,
    pub client: Option<String>,
}

impl ImageResolver for ImageContext {
    fn resolve(&self, raw: &str) -> Option<String> {
        match ImageRef::parse(raw) {
            ImageRef::Server => self.server.clone(),
            ImageRef::User => self.user.clone(),
            ImageRef::Client => self.client.clone(),
            ImageRef::Url(url) => as_url(url).map(str::to_string),
        }
    }
}

/// `Some` when Discord would accept the text as an embed URL
#[must_use]
pub fn as_url(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    ["https://", "http://", "attachment://"]
        .iter()
        .any(|scheme| raw.starts_with(scheme))
        .then_some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ImageContext {
        ImageContext {
            server: Some("https://cdn.example/guild.png".to_string()),
            user: Some("https://cdn.example/user.png".to_string()),
            client: None,
        }
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(ImageRef::parse("server"), ImageRef::Server);
        assert_eq!(ImageRef::parse(" User "), ImageRef::User);
        assert_eq!(ImageRef::parse("CLIENT"), ImageRef::Client);
        assert_eq!(
            ImageRef::parse("https://x.y/z.png"),
            ImageRef::Url("https://x.y/z.png")
        );
    }

    #[test]
    fn test_resolve_tokens() {
        let ctx = context();
        assert_eq!(
            ctx.resolve("server").as_deref(),
            Some("https://cdn.example/guild.png")
        );
        assert_eq!(
            ctx.resolve("user").as_deref(),
            Some("https://cdn.example/user.png")
        );
        assert_eq!(ctx.resolve("client"), None);
    }

    #[test]
    fn test_resolve_literal_urls() {
        let ctx = context();
        assert_eq!(
            ctx.resolve("https://example.com/a.png").as_deref(),
            Some("https://example.com/a.png")
        );
        assert_eq!(ctx.resolve("not a url"), None);
    }
}
