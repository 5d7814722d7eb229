//! Draft entity
//!
//! A draft is a message that is being put together over several interaction
//! round-trips. Every setter is forgiving: blank input leaves the stored value
//! alone and nothing ever fails. Problems surface when the draft is rendered
//! for sending.

use crate::editor::{
    EditorError, EditorResult,
    color::EmbedColor,
    image::{ImageResolver, as_url},
    sink::{EmbedAuthor, EmbedFooter, OutgoingMessage, ResolvedEmbed},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum message content length accepted by Discord
pub const CONTENT_MAX_LENGTH: u16 = 2000;

/// An in-progress message with optional embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    /// Identity of this draft, fresh for every created or reset draft
    pub id: Uuid,
    pub content: Option<String>,
    /// Whether the embed part should be sent
    pub embed_enabled: bool,
    pub title: Option<String>,
    /// Link attached to the title
    pub url: Option<String>,
    pub author: Option<String>,
    /// URL or symbolic token
    pub author_icon: Option<String>,
    pub description: Option<String>,
    pub color: Option<EmbedColor>,
    /// URL or symbolic token
    pub image: Option<String>,
    /// URL or symbolic token
    pub thumbnail: Option<String>,
    pub footer: Option<String>,
    /// URL or symbolic token
    pub footer_icon: Option<String>,
    /// Stamp the embed with the send time
    pub timestamp: bool,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            content: None,
            embed_enabled: false,
            title: None,
            url: None,
            author: None,
            author_icon: None,
            description: None,
            color: None,
            image: None,
            thumbnail: None,
            footer: None,
            footer_icon: None,
            timestamp: false,
        }
    }
}

/// `Some(text)` unless the text is empty or whitespace
fn non_blank(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Overwrite `slot` only when `text` carries something
fn apply(slot: &mut Option<String>, text: Option<&str>) -> bool {
    match text.and_then(non_blank) {
        Some(value) => {
            *slot = Some(value);
            true
        }
        None => false,
    }
}

/// Parse a yes/no style token
#[must_use]
pub fn parse_flag(token: &str) -> Option<bool> {
    match token.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" | "y" => Some(true),
        "false" | "no" | "off" | "0" | "n" => Some(false),
        _ => None,
    }
}

impl Draft {
    /// Create an empty draft
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_content(&mut self, text: &str) {
        apply(&mut self.content, Some(text));
    }

    pub fn set_title(&mut self, text: &str, url: Option<&str>) {
        let title = apply(&mut self.title, Some(text));
        let url = apply(&mut self.url, url);
        self.enable_embed_if(title || url);
    }

    pub fn set_author(&mut self, name: &str, icon: Option<&str>) {
        let name = apply(&mut self.author, Some(name));
        let icon = apply(&mut self.author_icon, icon);
        self.enable_embed_if(name || icon);
    }

    pub fn set_footer(&mut self, text: &str, icon: Option<&str>) {
        let text = apply(&mut self.footer, Some(text));
        let icon = apply(&mut self.footer_icon, icon);
        self.enable_embed_if(text || icon);
    }

    pub fn set_description(&mut self, text: &str) {
        let applied = apply(&mut self.description, Some(text));
        self.enable_embed_if(applied);
    }

    /// Set the color from a palette token, see [`EmbedColor::from_token`]
    pub fn set_color(&mut self, token: &str) {
        if token.trim().is_empty() {
            return;
        }
        self.color = Some(EmbedColor::from_token(token));
        self.embed_enabled = true;
    }

    pub fn set_image(&mut self, reference: &str) {
        let applied = apply(&mut self.image, Some(reference));
        self.enable_embed_if(applied);
    }

    pub fn set_thumbnail(&mut self, reference: &str) {
        let applied = apply(&mut self.thumbnail, Some(reference));
        self.enable_embed_if(applied);
    }

    /// Set the timestamp flag from a yes/no token; unknown tokens are ignored
    pub fn set_timestamp(&mut self, token: &str) {
        if let Some(flag) = parse_flag(token) {
            self.timestamp = flag;
            self.enable_embed_if(flag);
        }
    }

    pub fn set_embed_enabled(&mut self, enabled: bool) {
        self.embed_enabled = enabled;
    }

    fn enable_embed_if(&mut self, applied: bool) {
        if applied {
            self.embed_enabled = true;
        }
    }

    /// True when no field that makes a visible embed is set.
    /// Color, title URL and timestamp alone don't count.
    #[must_use]
    pub fn embed_is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.author.is_none()
            && self.footer.is_none()
            && self.image.is_none()
            && self.thumbnail.is_none()
    }

    /// True when neither content nor embed fields are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.embed_is_empty()
    }

    /// Apply `f` to every user-visible text and reference field
    #[must_use]
    pub fn map_text(&self, f: impl Fn(&str) -> String) -> Self {
        let map = |slot: &Option<String>| slot.as_deref().map(&f);
        Self {
            id: self.id,
            content: map(&self.content),
            embed_enabled: self.embed_enabled,
            title: map(&self.title),
            url: map(&self.url),
            author: map(&self.author),
            author_icon: map(&self.author_icon),
            description: map(&self.description),
            color: self.color,
            image: map(&self.image),
            thumbnail: map(&self.thumbnail),
            footer: map(&self.footer),
            footer_icon: map(&self.footer_icon),
            timestamp: self.timestamp,
        }
    }

    /// Resolve the embed part, symbolic tokens included
    #[must_use]
    pub fn resolve_embed(&self, images: &dyn ImageResolver) -> ResolvedEmbed {
        ResolvedEmbed {
            title: self.title.clone(),
            url: self.url.as_deref().and_then(as_url).map(str::to_string),
            author: self.author.as_ref().map(|name| EmbedAuthor {
                name: name.clone(),
                icon_url: self.author_icon.as_deref().and_then(|raw| images.resolve(raw)),
            }),
            description: self.description.clone(),
            color: self.color.unwrap_or_default().rgb(),
            image: self.image.as_deref().and_then(|raw| images.resolve(raw)),
            thumbnail: self.thumbnail.as_deref().and_then(|raw| images.resolve(raw)),
            footer: self.footer.as_ref().map(|text| EmbedFooter {
                text: text.clone(),
                icon_url: self.footer_icon.as_deref().and_then(|raw| images.resolve(raw)),
            }),
            timestamp: self.timestamp,
        }
    }

    /// Build the message to hand to a send sink.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NothingToSend`] when there is no content and
    /// the embed is disabled or renders empty.
    pub fn render(&self, images: &dyn ImageResolver) -> EditorResult<OutgoingMessage> {
        let embed = self
            .embed_enabled
            .then(|| self.resolve_embed(images))
            .filter(|embed| !embed.is_empty());
        let content = self.content.clone();

        if content.is_none() && embed.is_none() {
            return Err(EditorError::NothingToSend);
        }

        Ok(OutgoingMessage { content, embed })
    }
}
