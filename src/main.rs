//! Leadflow Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;

use anyhow::Context;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Update;
use teloxide::utils::command::BotCommands as TeloxideBotCommands;
use tracing::{error, info};

use leadflow::{
    api::{self, ApiState},
    config::Settings,
    database::{self, DatabaseService},
    handlers::{
        callbacks::handle_callback_query,
        commands::{admin, start},
        messages::handle_message,
    },
    i18n::I18n,
    services::ServiceFactory,
    state::StateStorage,
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    // Initialize logging; the guard must live until shutdown
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting Leadflow bot v{}...", leadflow::VERSION);

    // Database
    info!("Connecting to database...");
    let db_config = database::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        ..Default::default()
    };
    let pool = database::create_pool(&db_config).await?;
    database::run_migrations(&pool).await?;
    let db = DatabaseService::new(pool.clone());

    // Translations
    info!("Loading translations...");
    let mut i18n = I18n::new(&settings.i18n);
    i18n.load_translations().await?;

    // Conversation state store
    info!("Connecting to Redis...");
    let state_storage = StateStorage::new(settings.redis.clone()).await?;
    state_storage.test_connection().await?;

    // Bot and services
    let bot = Bot::new(&settings.bot.token);
    let services = ServiceFactory::new(bot.clone(), settings.clone(), db.clone())?;

    // Admin API server
    let api_state = ApiState {
        pool,
        db: db.clone(),
        services: services.clone(),
        settings: settings.clone(),
    };
    tokio::spawn(async move {
        if let Err(e) = api::serve(api_state).await {
            error!(error = %e, "Admin API server terminated");
        }
    });

    // Dispatcher
    let services_arc = Arc::new(services);
    let state_storage_arc = Arc::new(state_storage);
    let i18n_arc = Arc::new(i18n);
    let db_arc = Arc::new(db);
    let settings_arc = Arc::new(settings.clone());

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![
            services_arc,
            state_storage_arc,
            i18n_arc,
            db_arc,
            settings_arc
        ])
        .default_handler(|upd| async move {
            tracing::warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    if let Some(public_url) = &settings.bot.public_url {
        info!("Public URL configured: {}", public_url);
        info!("Note: webhook setup not implemented in this version, falling back to polling");
    }

    info!("Leadflow bot is ready, starting polling...");
    dispatcher.dispatch().await;

    info!("Leadflow bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<BotCommand>()
                        .endpoint(handle_commands),
                )
                .branch(dptree::endpoint(handle_messages)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
}

#[derive(TeloxideBotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Leadflow Bot Commands")]
enum BotCommand {
    #[command(description = "Start the bot and show the main menu")]
    Start,
    #[command(description = "Cancel the current form")]
    Cancel,
    #[command(description = "Show bot statistics (admin only)")]
    Stats,
    #[command(description = "Open the CRM dashboard (admin only)")]
    Admin,
    #[command(description = "Seed the demo catalog (admin only)")]
    Seed,
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: BotCommand,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
    i18n: Arc<I18n>,
    db: Arc<DatabaseService>,
    settings: Arc<Settings>,
) -> HandlerResult {
    let services = (*services).clone();
    let state_storage = (*state_storage).clone();
    let i18n = (*i18n).clone();
    let db = (*db).clone();
    let settings = (*settings).clone();

    let result = match cmd {
        BotCommand::Start => start::handle_start(bot, msg, services, i18n).await,
        BotCommand::Cancel => {
            start::handle_cancel(bot, msg, services, state_storage, i18n).await
        }
        BotCommand::Stats => admin::handle_stats(bot, msg, db, settings, i18n).await,
        BotCommand::Admin => admin::handle_admin_panel(bot, msg, settings, i18n).await,
        BotCommand::Seed => admin::handle_seed(bot, msg, db, settings, i18n).await,
    };

    if let Err(e) = result {
        error!(error = %e, "Error handling command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle regular messages
async fn handle_messages(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
    i18n: Arc<I18n>,
) -> HandlerResult {
    let services = (*services).clone();
    let state_storage = (*state_storage).clone();
    let i18n = (*i18n).clone();

    if let Err(e) = handle_message(bot, msg, services, state_storage, i18n).await {
        error!(error = %e, "Error handling message");
        return Err(e.into());
    }

    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: teloxide::types::CallbackQuery,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
    i18n: Arc<I18n>,
) -> HandlerResult {
    let services = (*services).clone();
    let state_storage = (*state_storage).clone();
    let i18n = (*i18n).clone();

    if let Err(e) = handle_callback_query(bot, query, services, state_storage, i18n).await {
        error!(error = %e, "Error handling callback query");
        return Err(e.into());
    }

    Ok(())
}
