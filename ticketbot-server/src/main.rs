use std::sync::Arc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use ticketbot_core::config::{BotSettings, ConfigProvider, EnvConfigProvider};
use ticketbot_core::platforms::telegram::{TelegramClient, TelegramPlatform};
use ticketbot_core::repositories::postgres::PostgresDialogueRepository;
use ticketbot_core::repositories::Repositories;
use ticketbot_core::services::ticket_render::bot_handle;
use ticketbot_core::services::BotService;
use ticketbot_core::{Database, Error};

#[derive(Parser, Debug, Clone)]
#[command(name = "ticketbot")]
#[command(author, version, about = "Ticket sales bot: registration, payment approval, QR tickets")]
struct Args {
    /// Postgres connection URL. Overrides DATABASE_URL.
    #[arg(long)]
    db_path: Option<String>,

    /// Apply migrations and exit.
    #[arg(long, default_value = "false")]
    migrate_only: bool,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("ticketbot=info".parse().unwrap_or_default())
        .add_directive("ticketbot_core=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("TicketBot starting. migrate_only={}", args.migrate_only);

    if let Err(e) = run_bot(args).await {
        error!("Bot error: {:?}", e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run_bot(args: Args) -> Result<(), Error> {
    let mut settings = BotSettings::from_env()?;
    if let Some(url) = args.db_path {
        settings.database_url = url;
    }

    let db = Database::new(&settings.database_url).await?;
    db.migrate().await?;
    if args.migrate_only {
        return Ok(());
    }

    let config = Arc::new(EnvConfigProvider::new());
    bot_handle(&config.bot_username())?;

    std::fs::create_dir_all(&settings.tickets_dir)?;
    std::fs::create_dir_all(&settings.templates_dir)?;

    let client = Arc::new(TelegramClient::new(&settings.telegram_token));
    let mut platform = TelegramPlatform::new(client.clone());
    let bot = BotService::new(
        Repositories::postgres(db.pool().clone()),
        client,
        config,
        Arc::new(PostgresDialogueRepository::new(db.pool().clone())),
        settings,
    );
    platform.connect().await?;

    // Updates are handled one at a time, in arrival order.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            next = platform.next_update() => match next {
                Some(incoming) => bot.handle_update(incoming).await,
                None => {
                    warn!("Update stream ended; exiting.");
                    break;
                }
            },
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    error!("Failed to listen for Ctrl‑C: {:?}", e);
                }
                info!("Ctrl‑C detected; shutting down...");
                break;
            }
        }
    }

    platform.disconnect().await;
    Ok(())
}
