//! Send sinks
//!
//! A sink delivers a committed draft somewhere. The editor only sees the
//! [`SendSink`] trait; the serenity-backed sinks live here too.

use crate::editor::{EditorError, EditorResult};
use async_trait::async_trait;
use poise::serenity_prelude::{
    ChannelId, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage, ExecuteWebhook,
    Http, Timestamp, Webhook,
};
use std::sync::Arc;
use tracing::info;

/// Embed author with a resolved icon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

/// Embed footer with a resolved icon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

/// Embed with every symbolic token already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEmbed {
    pub title: Option<String>,
    pub url: Option<String>,
    pub author: Option<EmbedAuthor>,
    pub description: Option<String>,
    pub color: u32,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub footer: Option<EmbedFooter>,
    pub timestamp: bool,
}

impl ResolvedEmbed {
    /// Discord rejects embeds without any visible part
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.thumbnail.is_none()
            && self.footer.is_none()
    }

    /// Convert into the serenity builder
    #[must_use]
    pub fn to_builder(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new().colour(self.color);

        if let Some(title) = &self.title {
            embed = embed.title(title);
        }
        if let Some(url) = &self.url {
            embed = embed.url(url);
        }
        if let Some(author) = &self.author {
            let mut builder = CreateEmbedAuthor::new(&author.name);
            if let Some(icon) = &author.icon_url {
                builder = builder.icon_url(icon);
            }
            embed = embed.author(builder);
        }
        if let Some(description) = &self.description {
            embed = embed.description(description);
        }
        if let Some(image) = &self.image {
            embed = embed.image(image);
        }
        if let Some(thumbnail) = &self.thumbnail {
            embed = embed.thumbnail(thumbnail);
        }
        if let Some(footer) = &self.footer {
            let mut builder = CreateEmbedFooter::new(&footer.text);
            if let Some(icon) = &footer.icon_url {
                builder = builder.icon_url(icon);
            }
            embed = embed.footer(builder);
        }
        if self.timestamp {
            embed = embed.timestamp(Timestamp::now());
        }

        embed
    }
}

/// A committed draft ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub content: Option<String>,
    pub embed: Option<ResolvedEmbed>,
}

/// Delivers committed drafts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SendSink: Send + Sync {
    /// Deliver the message once; no retries
    async fn send(&self, message: OutgoingMessage) -> EditorResult<()>;
}

/// Sends into a guild text channel as the bot
pub struct ChannelSink {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelSink {
    #[must_use]
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl SendSink for ChannelSink {
    async fn send(&self, message: OutgoingMessage) -> EditorResult<()> {
        let mut builder = CreateMessage::new();
        if let Some(content) = message.content {
            builder = builder.content(content);
        }
        if let Some(embed) = message.embed {
            builder = builder.embed(embed.to_builder());
        }

        self.channel_id
            .send_message(&*self.http, builder)
            .await
            .map_err(|e| EditorError::Delivery(e.to_string()))?;

        info!("Delivered draft to channel {}", self.channel_id);
        Ok(())
    }
}

/// Sends through a channel webhook with an optional name and avatar override
pub struct WebhookSink {
    http: Arc<Http>,
    webhook: Webhook,
    username: Option<String>,
    avatar_url: Option<String>,
}

impl WebhookSink {
    #[must_use]
    pub fn new(
        http: Arc<Http>,
        webhook: Webhook,
        username: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        Self {
            http,
            webhook,
            username,
            avatar_url,
        }
    }
}

#[async_trait]
impl SendSink for WebhookSink {
    async fn send(&self, message: OutgoingMessage) -> EditorResult<()> {
        let mut builder = ExecuteWebhook::new();
        if let Some(content) = message.content {
            builder = builder.content(content);
        }
        if let Some(embed) = message.embed {
            builder = builder.embed(embed.to_builder());
        }
        if let Some(username) = &self.username {
            builder = builder.username(username);
        }
        if let Some(avatar_url) = &self.avatar_url {
            builder = builder.avatar_url(avatar_url);
        }

        self.webhook
            .execute(&*self.http, false, builder)
            .await
            .map_err(|e| EditorError::Delivery(e.to_string()))?;

        info!("Delivered draft through webhook {}", self.webhook.id);
        Ok(())
    }
}
