use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use wikispider::search::{SessionConfig, run_search};
use wikispider::web::wiki::{node_from_path, url_for};
use wikispider::web::{LinkFilter, NeighborResolver, WikiFilter, WikiResolver};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "wikispider")]
#[command(about = "wikispider - Wikipedia path finder")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a chain of links from one article to another
    Search {
        /// Start article (name, /path or full URL)
        start: String,
        /// Target article (name, /path or full URL)
        target: String,
        /// Number of worker threads (defaults to the number of CPUs)
        #[arg(long, short = 'j')]
        workers: Option<usize>,
        /// Pages a worker may expand per epoch; zero or negative for no cap
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        max_chances: i64,
        /// Pause before each page fetch, in milliseconds
        #[arg(long, default_value = "0")]
        grace_period_ms: u64,
        /// Enable verbose output
        #[arg(long, short)]
        verbose: bool,
    },
    /// Print the article links found on one page
    Links {
        /// Article (name, /path or full URL)
        page: String,
        /// Enable verbose output
        #[arg(long, short)]
        verbose: bool,
    },
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Options for a path search
struct SearchOptions {
    workers: Option<usize>,
    max_chances: i64,
    grace_period_ms: u64,
}

// --- Search ---

/// Returns whether a path was found without errors.
fn find_path(start: &str, target: &str, options: &SearchOptions) -> Result<bool, Box<dyn std::error::Error>> {
    let start = node_from_path(start)?;
    let target = node_from_path(target)?;

    let mut config = SessionConfig::default()
        .with_max_chances(options.max_chances)
        .with_grace_period_millis(options.grace_period_ms);
    if let Some(workers) = options.workers {
        config = config.with_workers(workers);
    }

    println!("Searching: {} -> {}", url_for(&start), url_for(&target));
    println!("Workers: {}", config.num_workers);

    let report = run_search(
        start,
        target,
        config,
        Arc::new(WikiResolver::new()?),
        Arc::new(WikiFilter::new()),
    )?;

    println!();
    print!("{}", report);
    if report.solution_found() {
        println!("\nLinks:");
        for node in &report.solution {
            println!("  {}", url_for(node));
        }
    }
    println!("\n{}", report.statistics.format_summary());

    Ok(report.solution_found() && report.error.is_none())
}

// --- Links ---

fn list_links(page: &str) -> Result<(), Box<dyn std::error::Error>> {
    let page = node_from_path(page)?;
    let resolver = WikiResolver::new()?;
    let filter = WikiFilter::new();

    info!(page = %page, "fetching links");
    let links: BTreeSet<String> = resolver
        .resolve(&page)?
        .iter()
        .filter(|link| filter.is_acceptable(link))
        .map(|link| filter.canonicalize(link))
        .collect();

    println!("{} links on {}:", links.len(), url_for(&page));
    for link in &links {
        println!("  {}", link);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    match args.command {
        Commands::Search {
            start,
            target,
            workers,
            max_chances,
            grace_period_ms,
            verbose,
        } => {
            init_tracing(verbose);
            let options = SearchOptions {
                workers,
                max_chances,
                grace_period_ms,
            };
            match find_path(&start, &target, &options) {
                Ok(true) => {}
                Ok(false) => std::process::exit(1),
                Err(e) => {
                    eprintln!("Error during search: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Links { page, verbose } => {
            init_tracing(verbose);
            if let Err(e) = list_links(&page) {
                eprintln!("Error fetching links: {}", e);
                std::process::exit(1);
            }
        }
    }
}
