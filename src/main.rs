use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tracing::{error, info};

use catalog_editor::{
    config::Config,
    models::{Entity, EntityId},
    submission::{self, CatalogService, HttpCatalogService, SubmitOutcome},
    tui::{ui::truncate, App},
    Catalog, EntityDialog,
};

mod cli;

use cli::{Cli, Commands, FieldArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "catalog_editor=info");
    }

    let mut config = Config::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url)?;
    }
    config.validate()?;

    // The TUI owns the terminal, so it only logs to the file
    init_logging(&config, !matches!(cli.command, Commands::Tui));

    let service = HttpCatalogService::from_config(&config)
        .context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Tui => run_tui(config, Arc::new(service)).await,
        Commands::List => list_items(&service).await,
        Commands::Add { fields } => add_item(&service, &fields).await,
        Commands::Edit { id, fields } => edit_item(&service, EntityId::new(id), &fields).await,
    }
}

fn init_logging(config: &Config, to_stderr: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let directory = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = config
        .log_file
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("catalog-editor.log"));
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}

async fn run_tui(config: Config, service: Arc<dyn CatalogService>) -> Result<()> {
    info!("Launching TUI interface");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, service);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(_) => {
            info!("TUI exited successfully");
            Ok(())
        }
        Err(e) => {
            error!("TUI encountered an error: {}", e);
            Err(e)
        }
    }
}

async fn list_items(service: &HttpCatalogService) -> Result<()> {
    let items = service.list().await.context("Failed to load catalog")?;

    if items.is_empty() {
        println!("No items in catalog");
        return Ok(());
    }

    print_header();
    for entity in &items {
        print_row(entity);
    }
    println!();
    println!("Total: {} items", items.len());
    Ok(())
}

async fn add_item(service: &HttpCatalogService, fields: &FieldArgs) -> Result<()> {
    let mut dialog = EntityDialog::create();
    run_dialog(&mut dialog, service, fields, Catalog::default()).await
}

async fn edit_item(service: &HttpCatalogService, id: EntityId, fields: &FieldArgs) -> Result<()> {
    let catalog = Catalog::new(service.list().await.context("Failed to load catalog")?);
    let entity = catalog
        .find(&id)
        .cloned()
        .with_context(|| format!("No item with id {}", id))?;

    let mut dialog = EntityDialog::edit(entity);
    run_dialog(&mut dialog, service, fields, catalog).await
}

/// Fill the dialog from the command line flags and submit it once
async fn run_dialog(
    dialog: &mut EntityDialog,
    service: &HttpCatalogService,
    fields: &FieldArgs,
    mut catalog: Catalog,
) -> Result<()> {
    dialog.open();
    for (field, value) in fields.entries() {
        dialog.update(field, value);
    }

    match submission::submit(dialog, service, &mut catalog).await {
        SubmitOutcome::Saved(entity) => {
            println!("Saved item {}", entity.id);
            print_header();
            print_row(&entity);
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            eprintln!("Invalid item:");
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field.label(), message);
            }
            std::process::exit(1);
        }
        SubmitOutcome::Failed(err) => {
            eprintln!("Error saving item: {}", err);
            std::process::exit(1);
        }
        SubmitOutcome::Ignored => Err(anyhow::anyhow!("Dialog did not accept the submission")),
    }
}

fn print_header() {
    println!(
        "{:<26} {:<30} {:<6} {:<6} {:<20}",
        "ID", "Name", "No.", "Year", "Source"
    );
    println!("{}", "-".repeat(92));
}

fn print_row(entity: &Entity) {
    println!(
        "{:<26} {:<30} {:<6} {:<6} {:<20}",
        truncate(entity.id.as_str(), 26),
        truncate(&entity.fields.name, 30),
        entity.fields.sequence_number,
        truncate(&entity.fields.year_released, 6),
        truncate(&entity.fields.source, 20)
    );
}
