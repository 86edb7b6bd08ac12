// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use geo_search::utils::logging::{format_success, format_warning};
use geo_search::{
    Config, CsvExporter, DatasetType, HealthCheck, HealthReport, IndexClient, SchemaManager,
    SearchOptions, Validator, search_datasets,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "geo_search")]
#[command(version = "0.1.0")]
#[command(about = "Semantic search over GEO genomic datasets with GPT suitability filtering", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search datasets by disease query, write results to a CSV file
    Search {
        /// Disease query or research topic
        query: String,

        #[arg(short, long, value_enum, default_value_t = DatasetType::Microarray)]
        dataset_type: DatasetType,

        #[arg(short, long, default_value_t = 50)]
        top_k: usize,

        /// Apply GPT filtering for differential-expression suitability
        #[arg(long)]
        gpt_filter: bool,

        #[arg(long, default_value_t = 0.6)]
        confidence_threshold: f32,

        /// Return all GPT-annotated rows instead of only the ones that pass
        #[arg(long)]
        return_all: bool,

        /// Override the configured index directory
        #[arg(long, value_name = "DIR")]
        index_dir: Option<PathBuf>,

        /// Output CSV path (default: results_{dataset_type}_{query}.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the index installation and API credentials
    Verify,

    /// Show dataset counts per index table
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    geo_search::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Search {
            query,
            dataset_type,
            top_k,
            gpt_filter,
            confidence_threshold,
            return_all,
            index_dir,
            output,
        } => {
            let options = SearchOptions {
                dataset_type,
                top_k,
                use_gpt_filter: gpt_filter,
                confidence_threshold,
                return_all_gpt_results: return_all,
                index_dir,
            };
            cmd_search(&config, &query, &options, output).await?;
        }
        Commands::Verify => {
            cmd_verify(&config).await?;
        }
        Commands::Stats => {
            cmd_stats(&config).await?;
        }
    }

    Ok(())
}

async fn cmd_search(
    config: &Config,
    query: &str,
    options: &SearchOptions,
    output: Option<PathBuf>,
) -> Result<()> {
    info!("Searching for: {}", query);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or(ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Searching {} datasets...", options.dataset_type));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let results = search_datasets(query, options, config).await;
    spinner.finish_and_clear();

    let results = results.context("Search failed")?;

    if results.is_empty() {
        println!("\nNo results found for query: \"{}\"\n", query);
        println!("Try:");
        println!("  - Using different search terms");
        println!("  - Searching the other dataset type");
        if options.use_gpt_filter {
            println!("  - Lowering the confidence threshold or using --return-all");
        }
        return Ok(());
    }

    println!("\nSearch Results for: \"{}\"\n", query);
    println!("Found {} result(s)\n", results.len());
    println!("{}", "=".repeat(80));

    for (idx, result) in results.rows().iter().enumerate() {
        println!("\n{}. {}", idx + 1, result.format_summary(76).trim_end());

        if let Some(verdict) = &result.verdict {
            println!(
                "   GPT: {} (confidence {:.2}) {}",
                verdict.label(),
                verdict.confidence,
                Validator::truncate_text(&verdict.reasoning, 120)
            );
        }
    }

    println!("\n{}", "=".repeat(80));

    let (path, count) = match output {
        Some(path) => {
            let count = CsvExporter::export_to_path(&results, &path)?;
            (path, count)
        }
        None => {
            let exporter = CsvExporter::new(".")?;
            let filename = CsvExporter::default_filename(options.dataset_type, query);
            exporter.export(&results, &filename)?
        }
    };

    println!(
        "{}",
        format_success(&format!(
            "Search completed! {} results saved to: {}",
            count,
            path.display()
        ))
    );

    Ok(())
}

async fn cmd_verify(config: &Config) -> Result<()> {
    info!("Verifying index installation");

    let mut checks = Vec::new();

    let start = Instant::now();
    match Validator::validate_directory(&config.index.dir) {
        Ok(()) => checks.push(HealthCheck::healthy("index directory", start.elapsed())),
        Err(e) => {
            checks.push(HealthCheck::unhealthy(
                "index directory",
                e.to_string(),
                start.elapsed(),
            ));
            let report = HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string());
            println!("{}", report.format());
            return Ok(());
        }
    }

    let start = Instant::now();
    let client = match IndexClient::connect(&config.index.dir).await {
        Ok(client) => {
            client.ping().await?;
            checks.push(HealthCheck::healthy("index connection", start.elapsed()));
            client
        }
        Err(e) => {
            checks.push(HealthCheck::unhealthy(
                "index connection",
                e.to_string(),
                start.elapsed(),
            ));
            let report = HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string());
            println!("{}", report.format());
            return Ok(());
        }
    };

    let schema_manager = SchemaManager::new(&client);

    for dataset_type in DatasetType::all() {
        let table_name = config.index.table_name(dataset_type);
        let component = format!("{} table", dataset_type);
        let start = Instant::now();

        if schema_manager
            .verify(table_name, config.index.embedding_dim)
            .await?
        {
            let count = client.dataset_count(table_name).await?;
            let mut check = HealthCheck::healthy(&component, start.elapsed());
            check.message = Some(format!("{} datasets", count));
            checks.push(check);
        } else {
            checks.push(HealthCheck::unhealthy(
                &component,
                format!("table '{}' missing or schema mismatch", table_name),
                start.elapsed(),
            ));
        }
    }

    let start = Instant::now();
    if config.embedding.api_key.is_some() {
        checks.push(HealthCheck::healthy("embedding api key", start.elapsed()));
    } else {
        checks.push(HealthCheck::degraded(
            "embedding api key",
            "no API key configured, deterministic fallback in use".to_string(),
            start.elapsed(),
        ));
    }

    let start = Instant::now();
    if config.gpt.api_key.is_some() {
        checks.push(HealthCheck::healthy("gpt api key", start.elapsed()));
    } else {
        checks.push(HealthCheck::degraded(
            "gpt api key",
            "no API key configured, --gpt-filter will fail".to_string(),
            start.elapsed(),
        ));
    }

    let report = HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string());
    println!("{}", report.format());

    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    info!("Gathering index statistics");

    let client = IndexClient::connect(&config.index.dir)
        .await
        .context("Failed to open index")?;

    client.ping().await.context("Index connection failed")?;

    println!("\nIndex: {}\n", client.dir());

    for dataset_type in DatasetType::all() {
        let table_name = config.index.table_name(dataset_type);

        if client.table_exists(table_name).await? {
            let count = client.dataset_count(table_name).await?;
            println!("  {:<12} {} datasets", dataset_type, count);
        } else {
            println!(
                "  {:<12} {}",
                dataset_type,
                format_warning(&format!("table '{}' missing", table_name))
            );
        }
    }

    println!();

    Ok(())
}
