#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use clap::Parser;
use paperbot::access::KeyStore;
use paperbot::app::Orchestrator;
use paperbot::channels::{Channel, TelegramChannel};
use paperbot::cli::{Cli, Commands, KeysAction};
use paperbot::paper::Requestor;
use paperbot::providers::{OpenAiCompatProvider, Provider};
use paperbot::sessions::{InMemorySessionStore, SessionStore};
use paperbot::Config;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pin the rustls crypto provider so reqwest's TLS setup is unambiguous.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: failed to install default crypto provider: {e:?}");
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = Config::load_from(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(config).await,
        Commands::Keys { action } => manage_keys(action),
    }
}

async fn run_bot(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::new(
        config.telegram.bot_token.clone(),
        config.telegram.allowed_users.clone(),
    ));
    if !channel.health_check().await {
        warn!("telegram health check failed; starting anyway");
    }

    let provider: Arc<dyn Provider> = Arc::new(OpenAiCompatProvider::new(
        &config.generator.api_key,
        &config.generator.base_url,
    ));
    if let Err(e) = provider.warmup().await {
        warn!(error = %e, "provider warmup failed");
    }

    let requestor = Arc::new(Requestor::new(
        provider,
        config.generator.model.clone(),
        config.generator.temperature,
    ));
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let keys = Arc::new(KeyStore::open(Config::keys_path())?);

    info!(model = %config.generator.model, "starting paperbot");
    let orchestrator = Orchestrator::new(channel, store, keys, requestor);
    orchestrator.run().await
}

fn manage_keys(action: KeysAction) -> anyhow::Result<()> {
    let store = KeyStore::open(Config::keys_path())?;
    match action {
        KeysAction::Generate { count } => {
            for key in store.generate(count)? {
                println!("{key}");
            }
        }
        KeysAction::List => {
            for (key, redeemed_by) in store.list() {
                match redeemed_by {
                    Some(user) => println!("{key}  redeemed by {user}"),
                    None => println!("{key}  unused"),
                }
            }
        }
        KeysAction::Revoke { key } => {
            if store.revoke(&key)? {
                println!("revoked {key}");
            } else {
                println!("no such key: {key}");
            }
        }
    }
    Ok(())
}
