//! Replies to framework errors

use crate::checks::GateError;
use crate::commands::CommandError;
use crate::editor::{EditorError, Notice, ui};
use crate::{Data, ERROR_TARGET, Error, logging};
use poise::FrameworkError;
use poise::serenity_prelude::Permissions;
use tracing::error;

/// Generic text for errors users can't act on
pub const EXECUTION_ERROR: &str = "Something went wrong while running this command";

/// User facing notice for a command error
#[must_use]
pub fn classify(error: &Error, support_invite: Option<&str>) -> Notice {
    if let Some(gate) = error.downcast_ref::<GateError>() {
        Notice::warning("Warning", gate.to_string())
    } else if let Some(editor) = error.downcast_ref::<EditorError>() {
        Notice::warning("Warning", editor.to_string())
    } else if let Some(command) = error.downcast_ref::<CommandError>() {
        Notice::warning("Warning", command.to_string())
    } else {
        let text = match support_invite {
            Some(invite) => format!("{EXECUTION_ERROR}. If it keeps happening, reach out at {invite}"),
            None => format!("{EXECUTION_ERROR}."),
        };
        Notice::warning("Execution error", text)
    }
}

/// Notice for a command the bot lacks `missing` permissions to run
#[must_use]
pub fn missing_permissions_notice(missing: Permissions) -> Notice {
    Notice::warning(
        "Missing permissions",
        format!(
            "I need these permissions here: {}",
            missing.get_permission_names().join(", ")
        ),
    )
}

/// Log a framework error and answer the invoking user when possible
pub async fn handle(error: FrameworkError<'_, Data, Error>) {
    logging::log_command_error(&error);

    match error {
        FrameworkError::Command { error, ctx, .. } => {
            let notice = classify(&error, ctx.data().config.support_invite.as_deref());
            if let Err(e) = ctx.send(ui::notice_reply(&notice)).await {
                error!(target: ERROR_TARGET, "Failed to report command error: {e}");
            }
        }
        FrameworkError::CommandCheckFailed {
            error: Some(error),
            ctx,
            ..
        } => {
            let notice = classify(&error, None);
            if let Err(e) = ctx.send(ui::notice_reply(&notice)).await {
                error!(target: ERROR_TARGET, "Failed to report refused command: {e}");
            }
        }
        FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let notice = missing_permissions_notice(missing_permissions);
            if let Err(e) = ctx.send(ui::notice_reply(&notice)).await {
                error!(target: ERROR_TARGET, "Failed to report missing permissions: {e}");
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!(target: ERROR_TARGET, "Error while handling error: {e}");
            }
        }
    }
}
