use chrono::Utc;
use clap::{Parser, Subcommand};
use finn_valley_site::cache::CachedSource;
use finn_valley_site::server::{self, AppState};
use finn_valley_site::source::{LocalSource, SiteSource};
use finn_valley_site::{config, generate, output, schema};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "finn_valley_site=info,tower_http=info";

#[derive(Parser)]
#[command(name = "finn-valley-site")]
#[command(about = "Website for Finn Valley Athletics Club")]
#[command(long_about = "\
Website for Finn Valley Athletics Club

Static pages (home, about, contact) are built in. News posts and events come
from the hosted content store, or from a dataset export for offline work.

Content sources (first available wins):
  --dataset-export FILE     NDJSON export, one document per line
  [content] project_id      Hosted query API (or CONTENT_PROJECT_ID)
  (neither)                 Empty store: news and events pages show their empty state

Routes:
  /                  Home, with featured events
  /about, /contact   Fixed pages
  /news/{slug}       Newsroom and posts
  /events/{slug}     Events, training and event details
  /studio/...        Authoring studio mount (no site navigation)

Run 'finn-valley-site gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Site configuration file
    #[arg(long, default_value = "site.toml", global = true)]
    config: PathBuf,

    /// Read documents from an NDJSON dataset export instead of the hosted API
    #[arg(long, global = true)]
    dataset_export: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the site over HTTP
    Serve,
    /// Render every page to a static directory
    Build {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Check a dataset export against the document schemas
    Check,
    /// Print the document schemas as JSON
    Schema,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Schema => {
            println!("{}", schema::schema_json()?);
            return Ok(());
        }
        _ => {}
    }

    let site_config = config::apply_env_overrides(config::load_config(&cli.config)?, |key| {
        std::env::var(key).ok()
    })?;

    match cli.command {
        Command::Serve => {
            let source = SiteSource::open(&site_config.content, cli.dataset_export.as_deref())?;
            let source = CachedSource::new(source, site_config.content.revalidate());
            server::serve(AppState::new(site_config, source)).await?;
        }
        Command::Build { output: output_dir } => {
            let source = SiteSource::open(&site_config.content, cli.dataset_export.as_deref())?;
            println!("==> Building site \u{2192} {}", output_dir.display());
            let report = generate::build_site(&source, &site_config, &output_dir, Utc::now()).await?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", output_dir.display());
        }
        Command::Check => {
            let Some(path) = cli.dataset_export.as_deref() else {
                return Err("check needs a dataset export: pass --dataset-export FILE".into());
            };
            println!("==> Checking {}", path.display());
            let source = LocalSource::load(path)?;
            let reports = schema::check_dataset(source.documents());
            output::print_check_output(&reports);
            if reports.iter().any(|r| !r.is_clean()) {
                std::process::exit(1);
            }
            println!("==> Content is valid");
        }
        Command::GenConfig | Command::Schema => {}
    }

    Ok(())
}

/// Log to stderr so command output on stdout stays clean. `RUST_LOG`
/// overrides the default filter.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
