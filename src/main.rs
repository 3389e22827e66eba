//! Quote Keeper - keep, filter and sync a personal quote collection.
//!
//! Quotes live in a local `SQLite` key-value store. A reconciler merges a
//! remote quote list into the collection, keyed by exact text, without
//! touching local records.
//!
//!   quote-keeper show                     # Random quote from the selected category
//!   quote-keeper list -c Life             # Filter and remember the category
//!   quote-keeper add "Be kind." Life      # Add a quote
//!   quote-keeper export -o backup.json    # Snapshot to JSON
//!   quote-keeper watch                    # Sync every 30 seconds until Ctrl-C

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    export_to_file, format_categories, format_quote, format_quotes, format_sync_state,
    import_from_file, ConsoleListener, OutputFormat, Presenter, QuoteStore, Reconciler,
    SharedStore,
};
use cli::{Cli, Commands};
use domain::{AppConfig, AppError, SyncOutcome};
use infrastructure::{
    config_file_path, ensure_config_exists, load_config, load_config_from_file, HttpRemote,
    LocalStorage, MemoryStorage, RemoteSource,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Everything a command needs, opened once.
struct App {
    config: AppConfig,
    store: SharedStore,
    remote: Arc<dyn RemoteSource>,
    presenter: Presenter,
}

impl App {
    fn open(config: AppConfig) -> domain::Result<Self> {
        let storage = LocalStorage::open(&config.storage_db_path())?;
        let store = QuoteStore::initialize(Box::new(storage)).shared();

        let remote: Arc<dyn RemoteSource> = Arc::new(HttpRemote::new(&config.remote)?);
        let post_to = config.remote.post_on_add.then(|| Arc::clone(&remote));

        let presenter = Presenter::new(
            Arc::clone(&store),
            Box::new(MemoryStorage::new()),
            post_to,
        );

        Ok(Self {
            config,
            store,
            remote,
            presenter,
        })
    }

    fn reconciler(&self) -> Arc<Reconciler> {
        Arc::new(Reconciler::new(
            Arc::clone(&self.store),
            Arc::clone(&self.remote),
            Arc::new(ConsoleListener),
        ))
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    let format = cli
        .output_format()
        .map_err(|message| AppError::Config { message })?;

    let config = match &cli.config {
        Some(path) => load_config_from_file(path)?,
        None => load_config()?,
    };

    if let Commands::Config { init } = cli.command {
        return cmd_config(&config, cli.config.as_deref(), init);
    }

    let app = App::open(config)?;

    match cli.command {
        Commands::Show => cmd_show(&app).await?,
        Commands::List { category } => cmd_list(&app, category.as_deref(), format).await?,
        Commands::Categories => cmd_categories(&app).await,
        Commands::Add { text, category } => cmd_add(&app, &text, &category).await?,
        Commands::Export { output } => cmd_export(&app, &output).await?,
        Commands::Import { path } => cmd_import(&app, &path).await?,
        Commands::Sync => cmd_sync(&app).await?,
        Commands::Watch => cmd_watch(&app).await,
        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Show a random quote.
async fn cmd_show(app: &App) -> domain::Result<()> {
    let mut rng = StdRng::from_entropy();

    match app.presenter.show_random(&mut rng).await? {
        Some(quote) => println!("{}", format_quote(&quote)),
        None => {
            let filter = app.presenter.current_filter().await;
            println!(
                "No quotes in category {}",
                filter.as_deref().unwrap_or("all").yellow()
            );
        }
    }

    Ok(())
}

/// List quotes under a category filter.
async fn cmd_list(app: &App, category: Option<&str>, format: OutputFormat) -> domain::Result<()> {
    let (selected, quotes) = app.presenter.filter(category).await?;
    let refs: Vec<_> = quotes.iter().collect();

    let output = format_quotes(&refs, format).map_err(AppError::json_parse)?;

    if matches!(format, OutputFormat::Json) {
        println!("{output}");
    } else {
        println!("{} {} ({})", "📜 Category:".bold(), selected.cyan(), quotes.len());
        println!("{output}");
    }

    Ok(())
}

/// List categories.
async fn cmd_categories(app: &App) {
    let (categories, selected) = app.presenter.categories().await;
    println!("{}", format_categories(&categories, selected.as_deref()));
}

/// Add a quote.
async fn cmd_add(app: &App, text: &str, category: &str) -> domain::Result<()> {
    let record = app.presenter.add_quote(text, category).await?;
    println!("{} Added to {}", "✓".green().bold(), record.category.cyan());
    Ok(())
}

/// Export all quotes.
async fn cmd_export(app: &App, output: &Path) -> domain::Result<()> {
    let store = app.store.lock().await;
    if store.is_empty() {
        println!("{}", "Collection is empty, writing an empty snapshot".yellow());
    }
    let count = export_to_file(&store, output)?;
    println!(
        "{} Exported {} quotes to {}",
        "✓".green().bold(),
        count,
        output.display()
    );
    Ok(())
}

/// Import quotes from a snapshot.
async fn cmd_import(app: &App, path: &Path) -> domain::Result<()> {
    let mut store = app.store.lock().await;
    let count = import_from_file(&mut store, path)?;
    println!(
        "{} Quotes imported successfully! ({} added, {} total)",
        "✓".green().bold(),
        count,
        store.len()
    );
    Ok(())
}

/// Run one reconciliation.
async fn cmd_sync(app: &App) -> domain::Result<()> {
    let reconciler = app.reconciler();

    if let SyncOutcome::AlreadyRunning = reconciler.sync_once().await? {
        println!("A sync is already running");
    }

    Ok(())
}

/// Reconcile on the configured interval until Ctrl-C.
async fn cmd_watch(app: &App) {
    let reconciler = app.reconciler();
    let sync = &app.config.sync;

    if !sync.enabled {
        println!(
            "{} Periodic sync is disabled (sync.enabled = false in config)",
            "⏸".yellow().bold()
        );
        return;
    }

    println!(
        "{} Syncing every {}s, press Ctrl-C to stop",
        "🔄".bold(),
        sync.interval().as_secs()
    );

    Arc::clone(&reconciler)
        .run(sync, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
        })
        .await;

    println!();
    println!("{}", format_sync_state(&reconciler.state()));
}

/// Show or initialize configuration.
fn cmd_config(config: &AppConfig, explicit: Option<&Path>, init: bool) -> domain::Result<()> {
    let path: PathBuf = explicit.map_or_else(config_file_path, Path::to_path_buf);

    if init {
        if ensure_config_exists(&path)? {
            println!("{} Created {}", "✓".green().bold(), path.display());
        } else {
            println!("Config already exists at {}", path.display());
        }
        return Ok(());
    }

    let content = toml::to_string_pretty(config).map_err(|e| AppError::Config {
        message: format!("Failed to serialize config: {e}"),
    })?;

    println!("{} {}", "⚙️  Config file:".bold(), path.display());
    println!("{} {}", "💾 Storage:".bold(), config.storage_db_path().display());
    println!();
    println!("{content}");

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
