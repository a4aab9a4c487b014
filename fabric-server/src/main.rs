use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use fabric_bridge::Bridge;
use fabric_engine::sensor::spawn_from_path;
use fabric_engine::{Datasets, DisposalModel, EngineConfig, FabricEngine, SensorHub};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Serve stock, price, recommendation and recycling queries as JSON lines.
///
/// Each line on stdin is one request such as
/// `{"op": "StockLookup", "params": {"fabric": "cotton"}}`; each response
/// is written as one line on stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "fabric-server", version, about)]
struct Args {
    /// Stock table (Fabric Type, Price per Unit, Stock Available, Unit Type).
    #[arg(long, default_value = "textile_stock_dataset.csv")]
    stock: PathBuf,

    /// Demand table used for pricing and recommendations.
    #[arg(long, default_value = "textile_demand_dataset.csv")]
    demand: PathBuf,

    /// Fabric waste table the disposal classifier is trained on.
    #[arg(long, default_value = "Fabric_Waste_Data.csv")]
    waste: PathBuf,

    /// Optional TOML engine configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a previously saved disposal model instead of training one.
    #[arg(long)]
    load_model: Option<PathBuf>,

    /// Write the disposal model to this path after startup.
    #[arg(long)]
    save_model: Option<PathBuf>,

    /// Serial device or file streaming sensor telemetry lines.
    #[arg(long)]
    sensor: Option<PathBuf>,

    /// Answer a single request and exit.
    #[arg(long)]
    query: Option<String>,

    /// Override the low stock threshold from the config file.
    #[arg(long)]
    low_stock_threshold: Option<i64>,

    /// Override the forest seed from the config file.
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(threshold) = args.low_stock_threshold {
        config.low_stock_threshold = threshold;
    }
    if let Some(seed) = args.seed {
        config.forest.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn build_engine(
    datasets: Datasets,
    config: EngineConfig,
    load_model: Option<&Path>,
) -> Result<FabricEngine> {
    match load_model {
        Some(path) => {
            let model = DisposalModel::load_json(path)
                .with_context(|| format!("loading disposal model {}", path.display()))?;
            Ok(FabricEngine::with_model(datasets, config, model))
        }
        None => {
            let engine = tokio::task::spawn_blocking(move || FabricEngine::startup(datasets, config))
                .await
                .context("training task panicked")??;
            Ok(engine)
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let config = load_config(&args)?;

    let load_start = Instant::now();
    let datasets = Datasets::load_files(&args.stock, &args.demand, &args.waste)
        .context("loading datasets")?;
    let engine = build_engine(datasets, config, args.load_model.as_deref()).await?;
    tracing::info!(
        elapsed_ms = load_start.elapsed().as_millis() as u64,
        "startup complete"
    );

    if let Some(path) = &args.save_model {
        engine
            .model()
            .save_json(path)
            .with_context(|| format!("saving disposal model {}", path.display()))?;
    }

    let summary = engine.inventory_summary();
    tracing::info!(
        total_fabrics = summary.total_fabrics,
        current_inventory = summary.current_inventory,
        low_stock = summary.low_stock_count,
        high_demand = summary.high_demand_count,
        "inventory loaded"
    );

    let sensors = Arc::new(SensorHub::new());
    if let Some(path) = &args.sensor {
        spawn_from_path(path.clone(), Arc::clone(&sensors));
    }

    let mut bridge = Bridge::new(Arc::new(engine), sensors);

    if let Some(query) = &args.query {
        println!("{}", bridge.handle(query));
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("reading stdin")? {
                    Some(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        println!("{}", bridge.handle(line));
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, shutting down");
                break;
            }
        }
    }

    tracing::info!(requests = bridge.audit_len(), "server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn config_file_then_flag_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "low_stock_threshold = 25\n\n[forest]\nn_estimators = 7").unwrap();

        let args = Args::parse_from([
            "fabric-server",
            "--config",
            file.path().to_str().unwrap(),
            "--seed",
            "9",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.low_stock_threshold, 25);
        assert_eq!(config.forest.n_estimators, 7);
        assert_eq!(config.forest.seed, 9);
    }

    #[test]
    fn default_paths() {
        let args = Args::parse_from(["fabric-server"]);
        assert_eq!(args.stock, PathBuf::from("textile_stock_dataset.csv"));
        assert_eq!(args.demand, PathBuf::from("textile_demand_dataset.csv"));
        assert_eq!(args.waste, PathBuf::from("Fabric_Waste_Data.csv"));
        assert!(args.query.is_none());
    }

    #[test]
    fn override_policy_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[demand_policy]\nmode = \"override\"\nhigh = [\"cotton\"]\nlow = []"
        )
        .unwrap();
        let args = Args::parse_from(["fabric-server", "--config", file.path().to_str().unwrap()]);
        let config = load_config(&args).unwrap();
        assert_eq!(
            config.demand_policy,
            fabric_engine::DemandPolicy::Override {
                high: vec!["cotton".into()],
                low: vec![],
            }
        );
    }
}
