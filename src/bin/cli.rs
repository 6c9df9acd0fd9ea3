//! cafecrawl CLI
//!
//! Drives a crawl over an already-authenticated session. Sign in with a
//! normal browser, export the Cookie header to a file, and point
//! `--cookies` at it.

use std::path::PathBuf;

use cafecrawl::{
    error::Result, models::Config, pipeline, session::AuthSession, storage::CsvExporter,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// cafecrawl - Naver Cafe post and image harvester
#[derive(Parser, Debug)]
#[command(
    name = "cafecrawl",
    version,
    about = "Harvests cafe board posts and images within a date window"
)]

struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl posts inside the configured date window
    Crawl {
        /// File holding the Cookie header of a signed-in session
        #[arg(long, default_value = "cookies.txt")]
        cookies: PathBuf,

        /// Cafe identifier (overrides config)
        #[arg(long)]
        cafe: Option<String>,

        /// Menu identifier (overrides config)
        #[arg(long)]
        menu: Option<String>,

        /// Window start date, YYYY-MM-DD (overrides config)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Window end date, YYYY-MM-DD (overrides config)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Output directory for the export document
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("cafecrawl starting...");

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Crawl {
            cookies,
            cafe,
            menu,
            start,
            end,
            output,
        } => {
            if let Some(id) = cafe {
                config.board.cafe_id = id;
            }
            if let Some(id) = menu {
                config.board.menu_id = id;
            }
            if let Some(date) = start {
                config.window.start = date;
            }
            if let Some(date) = end {
                config.window.end = date;
            }
            if let Some(dir) = output {
                config.output.export_dir = dir;
            }
            config.validate()?;

            let session = AuthSession::from_cookie_file(&cookies, &config.board.base_url, &config.crawler)?;

            let export_path = PathBuf::from(&config.output.export_dir)
                .join(config.output.export_filename(&config.window));
            let mut sink = CsvExporter::new(&export_path);

            let stats = pipeline::run_crawler(&config, &session, &mut sink).await?;

            log::info!(
                "Done! {} post(s) collected, {} image(s) saved",
                stats.posts_collected,
                stats.images_downloaded
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (board, window, and image settings)");
        }
    }

    Ok(())
}
