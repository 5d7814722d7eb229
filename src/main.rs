use herald::config::{BotConfig, discord_token};
use herald::{Data, Error, checks, commands, error_handler, handlers, logging};
use poise::serenity_prelude::{self as serenity};
use serenity::GatewayIntents;
use tracing::{error, info};

/// Main function to run the bot
async fn async_main() -> Result<(), Error> {
    let config = BotConfig::load()?;
    logging::init(&config.log_dir)?;

    let token = discord_token(|name| std::env::var(name).ok())?;
    let sweep_interval = config.sweep_interval();
    let data = Data::load(config).await;

    // Idle drafts are dropped in the background
    let sweepers = sweep_interval.map(|every| {
        (
            data.composer.drafts().spawn_sweeper(every),
            data.welcome.drafts().spawn_sweeper(every),
        )
    });

    let framework_data = data.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            command_check: Some(|ctx| Box::pin(checks::command_gate(ctx))),
            pre_command: |ctx| {
                Box::pin(async move {
                    logging::log_command_start(ctx);
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    logging::log_command_end(ctx);
                })
            },
            on_error: |error| Box::pin(error_handler::handle(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                logging::log_console("Registering commands");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(framework_data)
            })
        })
        .build();

    // Member events drive welcome and leave messages
    let intents = GatewayIntents::non_privileged() | GatewayIntents::GUILD_MEMBERS;
    let mut client = serenity::ClientBuilder::new(token, intents)
        .event_handler(handlers::Handler)
        .framework(framework)
        .await?;

    // Component and member handlers read the shared data from the type map
    client.data.write().await.insert::<Data>(data.clone());

    info!("Starting bot...");
    let result = client.start().await;

    if let Some((composer, welcome)) = sweepers {
        composer.abort();
        welcome.abort();
    }
    if let Err(e) = data.save().await {
        error!("Failed to save guild configs on shutdown: {e}");
    }

    result.map_err(Into::into)
}

fn main() {
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Error::from)
        .and_then(|runtime| runtime.block_on(async_main()));

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
