mod render;

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use api::configuration_providers::http::HttpConfigurations;
use api::settings::ClientSettings;
use api::ConfigurationProvider;
use api::MappingId;
use api::MappingTable;
use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use tracing::debug;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use ui::ConfigurationStore;
use ui::UpdateOutcome;

#[derive(Debug, Parser)]
#[command(
    name = "proxy-admin",
    about = "Inspect and toggle the mappings of a running proxy",
    version
)]
struct Cli {
    /// Base URL of the admin server (overrides PROXY_ADMIN_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print all mappings grouped by origin
    List {
        /// Only show this origin
        #[arg(long)]
        origin: Option<String>,
        /// Print the records as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Activate a mapping
    Enable { id: MappingId },
    /// Deactivate a mapping
    Disable { id: MappingId },
    /// Set the active flag of a mapping explicitly
    Set {
        id: MappingId,
        #[arg(action = ArgAction::Set)]
        active: bool,
    },
    /// Keep refreshing and print the table whenever it changes
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value_t = 5)]
        interval: u64,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut settings = ClientSettings::from_env();
    if let Some(url) = cli.url {
        settings = settings.with_base_url(url);
    }
    let provider = HttpConfigurations::new(&settings)?;
    debug!(base = %provider.base_url(), timeout = ?settings.timeout, "using admin server");
    let store = ConfigurationStore::new(provider);

    match cli.command {
        Commands::List { origin, json } => list(&store, origin.as_deref(), json).await,
        Commands::Enable { id } => set_active(&store, id, true).await,
        Commands::Disable { id } => set_active(&store, id, false).await,
        Commands::Set { id, active } => set_active(&store, id, active).await,
        Commands::Watch { interval } => {
            let every = Duration::from_secs(interval.max(1));
            let ctrl_c = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            watch(&store, every, ctrl_c).await
        }
    }
}

async fn list(
    store: &ConfigurationStore<HttpConfigurations>,
    origin: Option<&str>,
    json: bool,
) -> Result<()> {
    store.fetch().await.context("could not load mappings")?;
    let table = store.mappings();

    if json {
        let records: Vec<_> = table
            .flatten()
            .into_iter()
            .filter(|m| origin.map_or(true, |o| o == m.origin))
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", render::table(&table, origin));
    }
    Ok(())
}

async fn set_active(
    store: &ConfigurationStore<HttpConfigurations>,
    id: MappingId,
    active: bool,
) -> Result<()> {
    store.fetch().await.context("could not load mappings")?;

    let Some(origin) = store.mappings().find(&id).map(|m| m.origin.clone()) else {
        anyhow::bail!("no mapping with id {}", id);
    };

    let outcome = store
        .update_mapping(&id, active)
        .await
        .with_context(|| format!("could not update mapping {}", id))?;

    match outcome {
        UpdateOutcome::Updated => info!(%id, active, "mapping updated"),
        UpdateOutcome::Unchanged => info!(%id, active, "mapping already in requested state"),
    }

    let table = store.mappings();
    let mut out = String::new();
    if let Some(mappings) = table.get(&origin) {
        render::group(&mut out, &origin, mappings);
    }
    print!("{}", out);
    Ok(())
}

/// Refreshes every `every` until `shutdown` completes.
async fn watch<P: ConfigurationProvider>(
    store: &ConfigurationStore<P>,
    every: Duration,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let mut updates = store.subscribe();
    let mut ticker = tokio::time::interval(every);
    let mut shown: Option<MappingTable> = None;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = store.fetch().await {
                    warn!(error = %e, "refresh failed");
                }
            }
            changed = updates.changed() => {
                changed.context("store closed")?;
                let snapshot = updates.borrow_and_update().clone();
                if shown.as_ref() != Some(snapshot.table().as_ref()) {
                    print!("{}", render::table(&snapshot, None));
                    println!();
                    shown = Some(MappingTable::clone(&snapshot));
                }
            }
            _ = &mut shutdown => {
                info!("stopping");
                return Ok(());
            }
        }
    }
}
