//! Command gate
//!
//! Every slash command passes [`command_gate`] before it runs. The decision
//! itself is the pure [`evaluate_gate`] so it can be tested without Discord.

use crate::{Context, Error};

/// Why a command was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("Bot is under maintenance, try again later")]
    Maintenance,

    #[error("Command is currently unavailable")]
    Disabled,

    #[error("Command is only available to bot owners")]
    Private,

    #[error("Command is premium only")]
    Premium,

    #[error("Command can only be used in a server")]
    GuildOnly,
}

/// Who may run a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Guild must have premium
    Premium,
    /// Bot owners only
    Private,
}

/// Command that stays usable during maintenance
pub const MAINTENANCE_COMMAND: &str = "maintenance";

/// Access level of a top level command
#[must_use]
pub fn command_access(command: &str) -> Access {
    match command {
        "message" => Access::Premium,
        "premium" | MAINTENANCE_COMMAND => Access::Private,
        _ => Access::Public,
    }
}

/// Facts the gate decides on
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    /// Top level command name
    pub command: &'a str,
    pub is_owner: bool,
    pub maintenance: bool,
    pub disabled_commands: &'a [String],
    /// `None` outside guilds
    pub guild_premium: Option<bool>,
}

/// Decide whether a command may run.
///
/// # Errors
///
/// Returns the first [`GateError`] that applies, checked in order:
/// maintenance, disabled, private, premium.
pub fn evaluate_gate(input: GateInput<'_>) -> Result<(), GateError> {
    if input.maintenance && input.command != MAINTENANCE_COMMAND {
        return Err(GateError::Maintenance);
    }
    if input
        .disabled_commands
        .iter()
        .any(|name| name.eq_ignore_ascii_case(input.command))
    {
        return Err(GateError::Disabled);
    }

    match command_access(input.command) {
        Access::Public => Ok(()),
        Access::Private if input.is_owner => Ok(()),
        Access::Private => Err(GateError::Private),
        Access::Premium => match input.guild_premium {
            None => Err(GateError::GuildOnly),
            Some(_) if input.is_owner => Ok(()),
            Some(true) => Ok(()),
            Some(false) => Err(GateError::Premium),
        },
    }
}

/// Global command check
///
/// # Errors
///
/// Returns the [`GateError`] refusing the command.
pub async fn command_gate(ctx: Context<'_>) -> Result<bool, Error> {
    let data = ctx.data();
    let command = ctx
        .command()
        .qualified_name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string();
    let input = GateInput {
        command: &command,
        is_owner: data.config.is_owner(ctx.author().id.get()),
        maintenance: data.maintenance(),
        disabled_commands: &data.config.disabled_commands,
        guild_premium: ctx.guild_id().map(|guild_id| data.is_premium(guild_id)),
    };

    evaluate_gate(input)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(command: &str) -> GateInput<'_> {
        GateInput {
            command,
            is_owner: false,
            maintenance: false,
            disabled_commands: &[],
            guild_premium: Some(false),
        }
    }

    #[test]
    fn test_public_command_passes() {
        assert_eq!(evaluate_gate(input("welcome")), Ok(()));
    }

    #[test]
    fn test_maintenance_blocks_everything_but_toggle() {
        let gate = GateInput {
            maintenance: true,
            ..input("welcome")
        };
        assert_eq!(evaluate_gate(gate), Err(GateError::Maintenance));

        let toggle = GateInput {
            maintenance: true,
            is_owner: true,
            ..input(MAINTENANCE_COMMAND)
        };
        assert_eq!(evaluate_gate(toggle), Ok(()));
    }

    #[test]
    fn test_disabled_command() {
        let disabled = vec!["Welcome".to_string()];
        let gate = GateInput {
            disabled_commands: &disabled,
            ..input("welcome")
        };
        assert_eq!(evaluate_gate(gate), Err(GateError::Disabled));
    }

    #[test]
    fn test_private_needs_owner() {
        assert_eq!(evaluate_gate(input("premium")), Err(GateError::Private));
        let owner = GateInput {
            is_owner: true,
            ..input("premium")
        };
        assert_eq!(evaluate_gate(owner), Ok(()));
    }

    #[test]
    fn test_premium_needs_guild_premium() {
        assert_eq!(evaluate_gate(input("message")), Err(GateError::Premium));
        let premium = GateInput {
            guild_premium: Some(true),
            ..input("message")
        };
        assert_eq!(evaluate_gate(premium), Ok(()));
        let dm = GateInput {
            guild_premium: None,
            ..input("message")
        };
        assert_eq!(evaluate_gate(dm), Err(GateError::GuildOnly));
    }

    #[test]
    fn test_gate_messages() {
        assert_eq!(GateError::Disabled.to_string(), "Command is currently unavailable");
        assert_eq!(GateError::Premium.to_string(), "Command is premium only");
    }
}
