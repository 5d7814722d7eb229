use crate::checks::GateError;
use crate::editor::{EditorReply, Notice, SessionKey, composer, ui};
use crate::welcome::WelcomeAction;
use crate::{Context, Error};
use poise::command;
use poise::serenity_prelude::GuildId;

/// Errors in command arguments
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("`{0}` is not a valid server id")]
    InvalidGuildId(String),
}

/// Compose a message with an optional embed and send it to this channel
#[command(
    slash_command,
    guild_only,
    required_bot_permissions = "SEND_MESSAGES | EMBED_LINKS"
)]
pub async fn message(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(GateError::GuildOnly)?;
    let session = SessionKey::member(ctx.author().id.get(), guild_id.get());
    let draft = ctx.data().composer.drafts().get_or_create(&session);

    ctx.send(ui::command_reply(&composer::control_surface(session, &draft)))
        .await?;
    Ok(())
}

/// Configure welcome and leave messages
#[command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    required_bot_permissions = "MANAGE_WEBHOOKS"
)]
pub async fn welcome(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(GateError::GuildOnly)?;
    let data = ctx.data();
    let reply = data
        .welcome
        .handle(guild_id.get(), WelcomeAction::Open, data)
        .await;

    match reply {
        EditorReply::Surface(surface) => ctx.send(ui::command_reply(&surface)).await?,
        EditorReply::Prompt(_) | EditorReply::Closed(_) => {
            ctx.send(ui::notice_reply(&Notice::warning(
                "Warning",
                "Welcome settings are unavailable right now",
            )))
            .await?
        }
    };
    Ok(())
}

/// Parse an optional server id, defaulting to the current server
fn target_guild(ctx: Context<'_>, guild: Option<String>) -> Result<GuildId, Error> {
    match guild {
        Some(raw) => parse_guild_id(&raw).map_err(Into::into),
        None => Ok(ctx.guild_id().ok_or(GateError::GuildOnly)?),
    }
}

fn parse_guild_id(raw: &str) -> Result<GuildId, CommandError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(GuildId::new)
        .ok_or_else(|| CommandError::InvalidGuildId(raw.to_string()))
}

/// Manage premium servers
#[command(slash_command, subcommands("grant", "revoke", "status"), subcommand_required)]
pub async fn premium(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Grant premium to a server
#[command(slash_command)]
pub async fn grant(
    ctx: Context<'_>,
    #[description = "Server id, defaults to this server"] guild: Option<String>,
) -> Result<(), Error> {
    let guild_id = target_guild(ctx, guild)?;
    ctx.data().set_premium(guild_id, true).await?;
    ctx.send(ui::notice_reply(&Notice::success(
        "Premium",
        format!("Server {guild_id} now has premium"),
    )))
    .await?;
    Ok(())
}

/// Revoke premium from a server
#[command(slash_command)]
pub async fn revoke(
    ctx: Context<'_>,
    #[description = "Server id, defaults to this server"] guild: Option<String>,
) -> Result<(), Error> {
    let guild_id = target_guild(ctx, guild)?;
    ctx.data().set_premium(guild_id, false).await?;
    ctx.send(ui::notice_reply(&Notice::success(
        "Premium",
        format!("Server {guild_id} no longer has premium"),
    )))
    .await?;
    Ok(())
}

/// Show whether a server has premium
#[command(slash_command)]
pub async fn status(
    ctx: Context<'_>,
    #[description = "Server id, defaults to this server"] guild: Option<String>,
) -> Result<(), Error> {
    let guild_id = target_guild(ctx, guild)?;
    let state = if ctx.data().is_premium(guild_id) { "has" } else { "does not have" };
    ctx.send(ui::notice_reply(&Notice::info(
        "Premium",
        format!("Server {guild_id} {state} premium"),
    )))
    .await?;
    Ok(())
}

/// Toggle maintenance mode
#[command(slash_command)]
pub async fn maintenance(
    ctx: Context<'_>,
    #[description = "Turn maintenance on or off, toggles when omitted"] enabled: Option<bool>,
) -> Result<(), Error> {
    let data = ctx.data();
    let enabled = enabled.unwrap_or(!data.maintenance());
    data.set_maintenance(enabled);

    let state = if enabled { "on" } else { "off" };
    ctx.send(ui::notice_reply(&Notice::success(
        "Maintenance",
        format!("Maintenance mode is {state}"),
    )))
    .await?;
    Ok(())
}

/// Every command the bot registers
#[must_use]
pub fn all() -> Vec<poise::Command<crate::Data, Error>> {
    vec![message(), welcome(), premium(), maintenance()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definitions() {
        use poise::serenity_prelude::Permissions;

        let cmd = message();
        assert_eq!(cmd.name, "message");
        assert!(cmd.guild_only);
        assert!(cmd.create_as_slash_command().is_some());
        assert_eq!(
            cmd.required_bot_permissions,
            Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS
        );

        let cmd = welcome();
        assert!(cmd.guild_only);
        assert!(cmd.required_permissions.contains(Permissions::MANAGE_GUILD));
        assert!(cmd.required_bot_permissions.contains(Permissions::MANAGE_WEBHOOKS));
    }

    #[test]
    fn test_premium_has_subcommands() {
        let cmd = premium();
        let names: Vec<&str> = cmd.subcommands.iter().map(|sub| sub.name.as_str()).collect();
        assert_eq!(names, vec!["grant", "revoke", "status"]);
        assert!(cmd.subcommand_required);
    }

    #[test]
    fn test_registered_commands_match_gate() {
        use crate::checks::{Access, command_access};
        let names: Vec<String> = all().into_iter().map(|cmd| cmd.name).collect();
        assert_eq!(names, vec!["message", "welcome", "premium", "maintenance"]);
        assert_eq!(command_access("message"), Access::Premium);
        assert_eq!(command_access("welcome"), Access::Public);
        assert_eq!(command_access("premium"), Access::Private);
    }

    #[test]
    fn test_parse_guild_id() {
        assert_eq!(parse_guild_id(" 123 "), Ok(GuildId::new(123)));
        assert_eq!(
            parse_guild_id("abc"),
            Err(CommandError::InvalidGuildId("abc".to_string()))
        );
        assert!(parse_guild_id("0").is_err());
    }
}
