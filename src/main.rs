use anyhow::Context as _;
use clap::Parser as _;
use dotenvy::dotenv;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod modules;
mod services;
mod snapshot;

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Discord bot token.
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    token: String,

    /// Application ID. Taken from the gateway session when omitted.
    #[arg(long, env = "BOT_ID")]
    application_id: Option<u64>,
}

// Custom user data passed to all command functions
pub struct Data {
    pub l10n: Arc<services::localization::LocalizationManager>,
    pub logger: Arc<services::logger::LoggerService>,
    pub cache: Arc<services::cache::ObjectCacheService>,
    pub events: services::event_manager::EventManager,
    pub module_definitions: Vec<modules::ModuleDefinition>,
}

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to set up the framework: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse configuration from the environment
    let args = Args::parse();

    info!("Starting moderation log bot...");

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_VOICE_STATES
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MODERATION
        | serenity::GatewayIntents::GUILD_EMOJIS_AND_STICKERS;

    // Initialize localization manager
    let l10n = Arc::new(services::localization::LocalizationManager::new());

    // Load and translate commands
    let mut commands = modules::commands();
    l10n.apply_translations(&mut commands);

    let framework_options = poise::FrameworkOptions {
        commands,
        on_error: |error| Box::pin(on_error(error)),
        event_handler: |ctx, event, framework, data| {
            Box::pin(services::event_manager::handle_event(
                ctx, event, framework, data,
            ))
        },
        ..Default::default()
    };

    let framework = poise::Framework::builder()
        .options(framework_options)
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                ctx.set_presence(
                    Some(serenity::ActivityData::watching(
                        services::event_manager::PRESENCE,
                    )),
                    serenity::OnlineStatus::Online,
                );

                info!("Registering commands globally...");
                if let Err(e) =
                    poise::builtins::register_globally(ctx, &framework.options().commands).await
                {
                    error!("Failed to register commands globally: {:?}", e);
                } else {
                    info!("Global command registration successful");
                }

                let gateway =
                    services::gateway::GuildGateway::new(ctx.http.clone(), ctx.cache.clone());
                let registry = Arc::new(services::log_channels::LogChannelRegistry::new());
                let logger = Arc::new(services::logger::LoggerService::new(gateway, registry));

                // Initialize object cache service
                let cache = Arc::new(services::cache::ObjectCacheService::new());
                cache.start_cleanup_runner();

                Ok(Data {
                    l10n,
                    logger,
                    cache,
                    events: services::event_manager::EventManager::new(),
                    module_definitions: modules::definitions(),
                })
            })
        })
        .build();

    let mut cache_settings = ::serenity::cache::Settings::default();
    cache_settings.max_messages = 2048;

    let mut builder = serenity::ClientBuilder::new(&args.token, intents)
        .framework(framework)
        .cache_settings(cache_settings);
    if let Some(application_id) = args.application_id {
        builder = builder.application_id(serenity::ApplicationId::new(application_id));
    }

    let mut client = builder.await.context("Failed to create client")?;

    info!("Bot is ready!");
    client.start_autosharded().await.context("Client error")?;

    Ok(())
}
