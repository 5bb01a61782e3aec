//! `tablekit` command line.
//!
//! ```text
//! tablekit render <table.json> [--issues issues.json] [--zoom Z] [--config cfg] [-o out.svg]
//! tablekit inspect <table.json> [--config cfg]
//! tablekit overview <store_id> [--data-dir dir] [--config cfg]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use tablekit::{
    init_logging, render_svg, Config, EventBus, Issue, JsonDirectoryStore, MissingDeviceMatcher,
    Table, TableGeometry, TableSync,
};

#[derive(Debug, Parser)]
#[command(
    name = "tablekit",
    about = "Render and inspect retail table layouts",
    version
)]
struct Cli {
    /// Configuration file (.json or .toml).
    #[arg(long, global = true, env = "TABLEKIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a stored table document to SVG.
    Render {
        table: PathBuf,
        /// JSON array of store issues used to flag missing devices.
        #[arg(long)]
        issues: Option<PathBuf>,
        /// Display zoom, clamped to 0.5..=2.0.
        #[arg(long)]
        zoom: Option<f64>,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print surface assignment and local coordinates of every device.
    Inspect { table: PathBuf },
    /// List the tables of a store with their missing-device counts.
    Overview {
        store_id: String,
        /// Directory of table documents; defaults to `storage.data_dir`.
        #[arg(long, env = "TABLEKIT_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("invalid config file {}", path.display()))?,
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)?,
            Err(err) => {
                warn!("{}; using default configuration", err);
                Config::default()
            }
        },
    };
    Ok(config)
}

fn read_table(path: &Path) -> anyhow::Result<Table> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a table document", path.display()))
}

fn read_issues(path: &Path) -> anyhow::Result<Vec<Issue>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not an issue list", path.display()))
}

fn render(
    config: &Config,
    table: &Path,
    issues: Option<&Path>,
    zoom: Option<f64>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let table = read_table(table)?;
    let matcher = match issues {
        Some(path) => MissingDeviceMatcher::new(read_issues(path)?),
        None => MissingDeviceMatcher::default(),
    };

    let mut renderer = config.renderer();
    if let Some(zoom) = zoom {
        renderer.zoom_mut().set(zoom);
    }
    let scene = renderer.render(&table, &matcher);
    let svg = render_svg(&scene, renderer.style());

    match output {
        Some(path) => {
            std::fs::write(path, svg).with_context(|| format!("cannot write {}", path.display()))?;
            info!(
                "Rendered {} ({} devices, {} missing) to {}",
                table.id,
                scene.devices.len(),
                scene.missing_count(),
                path.display()
            );
        }
        None => println!("{}", svg),
    }
    Ok(())
}

fn inspect(config: &Config, table: &Path) -> anyhow::Result<()> {
    let table = read_table(table)?;
    let geometry = TableGeometry::for_table(&table, &config.effective_geometry())?;

    println!("{} [{}] {}", table.id, table.table_type.as_str(), table.name);
    for surface in geometry.surfaces() {
        println!(
            "  surface {}: origin {} size {}x{}",
            surface.index, surface.origin, surface.size.width, surface.size.height
        );
    }
    for device in &table.devices {
        let location = geometry.locate(&device.position);
        let parent = device
            .attached_to
            .as_deref()
            .map(|p| format!(" attached to {}", p))
            .unwrap_or_default();
        println!(
            "  {:<24} surface {} local {} global {}{}",
            device.label(),
            location.surface,
            location.local,
            device.position,
            parent
        );
    }
    Ok(())
}

async fn overview(config: &Config, store_id: &str, data_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let root = data_dir.unwrap_or_else(|| config.storage.data_dir.clone());
    let mut store = JsonDirectoryStore::new(&root);
    if let Some(base) = &config.storage.public_base_url {
        store = store.with_public_base_url(base.clone());
    }

    let sync = TableSync::with_backend(Arc::new(store), Arc::new(EventBus::new()));
    let overview = sync
        .store_overview(store_id)
        .await
        .with_context(|| format!("cannot read store {} from {}", store_id, root.display()))?;

    let renderer = config.renderer();
    println!("store {}: {} tables", overview.store_id, overview.tables.len());
    for table in &overview.tables {
        let scene = renderer.render(table, &overview.missing);
        println!(
            "  {:<16} {:<24} {:>3} devices {:>3} missing",
            table.id,
            table.table_type.as_str(),
            scene.devices.len(),
            scene.missing_count()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Render {
            table,
            issues,
            zoom,
            output,
        } => render(&config, &table, issues.as_deref(), zoom, output.as_deref()),
        Command::Inspect { table } => inspect(&config, &table),
        Command::Overview { store_id, data_dir } => overview(&config, &store_id, data_dir).await,
    }
}
