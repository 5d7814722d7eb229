use crate::checks::{GateError, GateInput, evaluate_gate};
use crate::editor::{
    ChannelSink, ComponentId, ComposerAction, CustomIdError, EditorReply, ImageContext, Notice,
    Scope, SessionKey, ui,
};
use crate::welcome::{Submission, WelcomeAction, WelcomeKind};
use crate::{Data, EVENT_TARGET, logging};
use poise::serenity_prelude::{
    self as serenity, ChannelId, ComponentInteraction, ComponentInteractionDataKind, Context,
    CreateInteractionResponse, CreateInteractionResponseMessage, EventHandler, GuildId,
    Interaction, Member, ModalInteraction, Permissions, Ready, Timestamp, User,
};
use thiserror::Error;
use tracing::{error, info, warn};

pub struct Handler;

/// Why an interaction was not routed to an editor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("This panel belongs to someone else, open your own with /message")]
    Foreign,

    #[error("You need the Manage Server permission to change these settings")]
    MissingPermission,

    #[error(transparent)]
    CustomId(#[from] CustomIdError),

    #[error(transparent)]
    Gate(#[from] GateError),
}

/// Who is interacting, and where
#[derive(Debug, Clone, Copy)]
pub struct Interactor {
    pub user_id: u64,
    pub guild_id: Option<u64>,
    pub can_manage_guild: bool,
}

/// Check that the interactor owns the session the component belongs to
///
/// # Errors
///
/// Returns [`RouteError`] when the session belongs to another member or
/// guild, or settings are changed without permission.
pub fn authorize(id: &ComponentId, who: Interactor) -> Result<SessionKey, RouteError> {
    let guild_matches = who.guild_id == Some(id.session.guild_id());
    match (id.scope, id.session) {
        (Scope::Message, SessionKey::Member { user_id, .. })
            if user_id == who.user_id && guild_matches =>
        {
            Ok(id.session)
        }
        (Scope::Settings, SessionKey::Guild { .. }) if guild_matches => {
            if who.can_manage_guild {
                Ok(id.session)
            } else {
                Err(RouteError::MissingPermission)
            }
        }
        _ => Err(RouteError::Foreign),
    }
}

/// Apply the gate of the command that opens panels of `scope`, so
/// components stop working in maintenance or once premium lapses
///
/// # Errors
///
/// Returns the [`GateError`] that command would be refused with.
pub fn gate_panel(data: &Data, scope: Scope, who: Interactor) -> Result<(), GateError> {
    let command = match scope {
        Scope::Message => "message",
        Scope::Settings => "welcome",
    };
    evaluate_gate(GateInput {
        command,
        is_owner: data.config.is_owner(who.user_id),
        maintenance: data.maintenance(),
        disabled_commands: &data.config.disabled_commands,
        guild_premium: who
            .guild_id
            .map(|guild_id| data.is_premium(GuildId::new(guild_id))),
    })
}

fn can_manage(permissions: Option<Permissions>) -> bool {
    permissions.is_some_and(|permissions| {
        permissions.contains(Permissions::MANAGE_GUILD)
            || permissions.contains(Permissions::ADMINISTRATOR)
    })
}

async fn shared_data(ctx: &Context) -> Option<Data> {
    let data = ctx.data.read().await.get::<Data>().cloned();
    if data.is_none() {
        error!(target: EVENT_TARGET, "Shared data missing from the client type map");
    }
    data
}

/// Image URLs for a composer render
fn composer_images(ctx: &Context, guild_id: Option<GuildId>, user: &User) -> ImageContext {
    ImageContext {
        server: guild_id
            .and_then(|guild_id| ctx.cache.guild(guild_id).and_then(|guild| guild.icon_url())),
        user: Some(user.face()),
        client: Some(ctx.cache.current_user().face()),
    }
}

fn warning_response(error: &RouteError) -> CreateInteractionResponse {
    let notice = Notice::warning("Warning", error.to_string());
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .embed(ui::notice_embed(&notice))
            .ephemeral(true),
    )
}

/// Parse, authorize and run the editor action a component asks for
#[allow(clippy::too_many_arguments)]
async fn route(
    ctx: &Context,
    data: &Data,
    custom_id: &str,
    who: Interactor,
    submission: Submission,
    channel_id: ChannelId,
    user: &User,
    guild_id: Option<GuildId>,
) -> Result<EditorReply, RouteError> {
    let id = ComponentId::parse(custom_id)?;
    let session = authorize(&id, who)?;
    gate_panel(data, id.scope, who)?;

    match id.scope {
        Scope::Message => {
            let values = match submission {
                Submission::Modal(values) => Some(values),
                _ => None,
            };
            let action = ComposerAction::from_component(&id, values)?;
            let sink = ChannelSink::new(ctx.http.clone(), channel_id);
            let images = composer_images(ctx, guild_id, user);
            Ok(data.composer.handle(session, action, &sink, &images).await)
        }
        Scope::Settings => {
            let action = WelcomeAction::from_component(&id, submission)?;
            Ok(data
                .welcome
                .handle(session.guild_id(), action, data)
                .await)
        }
    }
}

/// The response to send back for a component or modal
#[allow(clippy::too_many_arguments)]
async fn respond(
    ctx: &Context,
    data: &Data,
    custom_id: &str,
    submission: Submission,
    channel_id: ChannelId,
    user: &User,
    permissions: Option<Permissions>,
    guild_id: Option<GuildId>,
) -> CreateInteractionResponse {
    let who = Interactor {
        user_id: user.id.get(),
        guild_id: guild_id.map(GuildId::get),
        can_manage_guild: can_manage(permissions),
    };

    match route(ctx, data, custom_id, who, submission, channel_id, user, guild_id).await {
        Ok(reply) => ui::component_response(&reply),
        Err(e) => {
            warn!(target: EVENT_TARGET, custom_id, user_id = who.user_id, "Interaction refused: {e}");
            warning_response(&e)
        }
    }
}

async fn handle_component(ctx: &Context, data: &Data, component: &ComponentInteraction) {
    logging::log_interaction("component", &component.data.custom_id, &component.user, component.guild_id);
    let submission = match &component.data.kind {
        ComponentInteractionDataKind::ChannelSelect { values } => {
            Submission::Channels(values.iter().map(|id| id.get()).collect())
        }
        _ => Submission::None,
    };
    let response = respond(
        ctx,
        data,
        &component.data.custom_id,
        submission,
        component.channel_id,
        &component.user,
        component.member.as_ref().and_then(|member| member.permissions),
        component.guild_id,
    )
    .await;

    if let Err(e) = component.create_response(&ctx.http, response).await {
        error!(target: EVENT_TARGET, custom_id = %component.data.custom_id, "Failed to answer component: {e}");
    }
}

async fn handle_modal(ctx: &Context, data: &Data, modal: &ModalInteraction) {
    logging::log_interaction("modal", &modal.data.custom_id, &modal.user, modal.guild_id);
    let submission = Submission::Modal(ui::modal_values(&modal.data.components));
    let response = respond(
        ctx,
        data,
        &modal.data.custom_id,
        submission,
        modal.channel_id,
        &modal.user,
        modal.member.as_ref().and_then(|member| member.permissions),
        modal.guild_id,
    )
    .await;

    if let Err(e) = modal.create_response(&ctx.http, response).await {
        error!(target: EVENT_TARGET, custom_id = %modal.data.custom_id, "Failed to answer modal: {e}");
    }
}

async fn member_event(
    ctx: &Context,
    kind: WelcomeKind,
    guild_id: GuildId,
    user: &User,
    joined_at: Option<Timestamp>,
) {
    if user.bot {
        return;
    }
    let Some(data) = shared_data(ctx).await else {
        return;
    };
    if let Err(e) = crate::welcome::deliver(ctx, &data, kind, guild_id, user, joined_at).await {
        warn!(
            target: EVENT_TARGET,
            guild_id = %guild_id,
            user_id = %user.id,
            "Failed to deliver {kind} message: {e}"
        );
    }
}

#[serenity::async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready, but the cache may not be fully populated yet.
    async fn ready(&self, ctx: Context, ready: Ready) {
        let user_name = ready.user.name.clone();
        let shard_id = ctx.shard_id;
        info!("Connected as {user_name}, shard {shard_id}");
    }

    /// Called when the cache is fully populated.
    async fn cache_ready(&self, ctx: Context, guilds: Vec<GuildId>) {
        let guild_count_cache = ctx.cache.guild_count();
        let guild_count = guilds.len();
        if guild_count != guild_count_cache {
            warn!(
                "Cache guild count mismatch: {guild_count_cache} (cache) vs {guild_count} (actual)"
            );
        }
        info!("Cache ready! The bot is in {guild_count} guild(s)");
    }

    /// Routes editor components and modals by their custom id
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Some(data) = shared_data(&ctx).await else {
            return;
        };
        match interaction {
            Interaction::Component(component) => handle_component(&ctx, &data, &component).await,
            Interaction::Modal(modal) => handle_modal(&ctx, &data, &modal).await,
            _ => {}
        }
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        member_event(
            &ctx,
            WelcomeKind::Join,
            new_member.guild_id,
            &new_member.user,
            new_member.joined_at,
        )
        .await;
    }

    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild_id: GuildId,
        user: User,
        member_data_if_available: Option<Member>,
    ) {
        let joined_at = member_data_if_available.and_then(|member| member.joined_at);
        member_event(&ctx, WelcomeKind::Leave, guild_id, &user, joined_at).await;
    }
}
