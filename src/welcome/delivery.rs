//! Welcome delivery on member join and leave

use crate::editor::{EditorError, ImageContext, ImageResolver, SendSink, WebhookSink};
use crate::welcome::{
    settings::{WelcomeKind, WelcomeSettings},
    variables::{GuildFacts, UserFacts, Variables},
};
use crate::{BOT_NAME, Data, EVENT_TARGET, Error};
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{
    ChannelId, Context, CreateWebhook, GuildId, Timestamp, User, Webhook, WebhookId,
};
use tracing::{debug, info, warn};

/// What delivery needs from Discord for one member event
#[derive(Debug, Clone)]
pub struct DeliveryFacts {
    pub guild: GuildFacts,
    pub user: UserFacts,
    pub client: UserFacts,
}

impl DeliveryFacts {
    fn images(&self) -> ImageContext {
        ImageContext {
            server: self.guild.icon.clone(),
            user: Some(self.user.avatar.clone()),
            client: Some(self.client.avatar.clone()),
        }
    }
}

fn utc(timestamp: Timestamp) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(timestamp.unix_timestamp(), 0).unwrap_or_default()
}

fn user_facts(user: &User, joined_at: Option<Timestamp>) -> UserFacts {
    UserFacts {
        id: user.id.get(),
        name: user.name.clone(),
        avatar: user.face(),
        created: utc(user.created_at()),
        joined: joined_at.map(utc),
    }
}

/// Collect facts from the cache; `None` when the guild isn't cached
fn collect_facts(
    ctx: &Context,
    guild_id: GuildId,
    user: &User,
    joined_at: Option<Timestamp>,
) -> Option<DeliveryFacts> {
    let guild = {
        let guild = ctx.cache.guild(guild_id)?;
        GuildFacts {
            name: guild.name.clone(),
            icon: guild.icon_url(),
            members: guild.member_count,
            created: utc(guild_id.created_at()),
        }
    };
    let client = {
        let current = ctx.cache.current_user();
        user_facts(&current, None)
    };

    Some(DeliveryFacts {
        guild,
        user: user_facts(user, joined_at),
        client,
    })
}

/// Message, webhook name and avatar for an event, all variables substituted.
///
/// `None` when welcome is off, no channel is set or the message would be
/// empty.
#[must_use]
pub fn prepare(
    settings: &WelcomeSettings,
    kind: WelcomeKind,
    facts: &DeliveryFacts,
) -> Option<PreparedDelivery> {
    if !settings.enabled {
        return None;
    }
    let channel_id = settings.channel_id?;

    let variables = Variables::for_member(&facts.guild, &facts.user, &facts.client);
    let images = facts.images();
    let draft = settings.message(kind).map_text(|text| variables.format(text));
    let message = match draft.render(&images) {
        Ok(message) => message,
        Err(EditorError::NothingToSend) => return None,
        Err(e) => {
            warn!(target: EVENT_TARGET, "Failed to render {kind} message: {e}");
            return None;
        }
    };

    Some(PreparedDelivery {
        channel_id,
        message,
        username: settings
            .webhook_name
            .as_deref()
            .map(|name| variables.format(name)),
        avatar_url: settings
            .webhook_avatar
            .as_deref()
            .and_then(|avatar| images.resolve(&variables.format(avatar))),
    })
}

/// A rendered welcome message and where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDelivery {
    pub channel_id: u64,
    pub message: crate::editor::OutgoingMessage,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

/// Webhook for the welcome channel, created when missing or stale
async fn welcome_webhook(
    ctx: &Context,
    data: &Data,
    guild_id: GuildId,
    settings: &WelcomeSettings,
    channel_id: ChannelId,
) -> Result<Webhook, Error> {
    if let Some(webhook_id) = settings.webhook_id {
        match ctx.http.get_webhook(WebhookId::new(webhook_id)).await {
            Ok(webhook) if webhook.channel_id == Some(channel_id) && webhook.token.is_some() => {
                return Ok(webhook);
            }
            Ok(_) => debug!(target: EVENT_TARGET, "Webhook {webhook_id} is stale, recreating"),
            Err(e) => debug!(target: EVENT_TARGET, "Webhook {webhook_id} unavailable: {e}"),
        }
    }

    let webhook = channel_id
        .create_webhook(ctx, CreateWebhook::new(BOT_NAME))
        .await?;
    info!(
        target: EVENT_TARGET,
        guild_id = %guild_id,
        channel_id = %channel_id,
        webhook_id = %webhook.id,
        "Created welcome webhook"
    );
    data.set_welcome_webhook(guild_id, webhook.id.get()).await?;
    Ok(webhook)
}

/// Send the join or leave message of `guild_id` for `user`. `joined_at` is
/// the member's join time when Discord sent it.
///
/// # Errors
///
/// Returns an error when the webhook can't be created or the message can't
/// be delivered.
pub async fn deliver(
    ctx: &Context,
    data: &Data,
    kind: WelcomeKind,
    guild_id: GuildId,
    user: &User,
    joined_at: Option<Timestamp>,
) -> Result<(), Error> {
    let settings = data.welcome_settings(guild_id);
    if !settings.enabled {
        return Ok(());
    }
    let Some(facts) = collect_facts(ctx, guild_id, user, joined_at) else {
        debug!(target: EVENT_TARGET, guild_id = %guild_id, "Guild not cached, skipping {kind} message");
        return Ok(());
    };
    let Some(prepared) = prepare(&settings, kind, &facts) else {
        debug!(target: EVENT_TARGET, guild_id = %guild_id, "Nothing to deliver for {kind}");
        return Ok(());
    };

    let channel_id = ChannelId::new(prepared.channel_id);
    let webhook = welcome_webhook(ctx, data, guild_id, &settings, channel_id).await?;
    let sink = WebhookSink::new(
        ctx.http.clone(),
        webhook,
        prepared.username,
        prepared.avatar_url,
    );
    sink.send(prepared.message).await?;

    info!(
        target: EVENT_TARGET,
        guild_id = %guild_id,
        user_id = %user.id,
        "Delivered {kind} message"
    );
    Ok(())
}
