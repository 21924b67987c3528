use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use shelf_monitor::{
    Carousel, CategoryFilter, LibraryApiClient, ShelfSummary, StatsError, StatsView,
    SystemClock, config::AppConfig, export, filter_books, load_shelf, load_stats, popular_book,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "shelf-monitor")]
#[command(about = "Library catalog browser and loan statistics")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank the categories a user borrows from most
    Stats {
        /// User whose loans to summarize (defaults to library.user_id)
        #[arg(long)]
        user: Option<i64>,
        /// Number of categories to show (defaults to stats.top_n)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        top: Option<u64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write a timestamped CSV into this directory instead of stdout
        #[arg(long, conflicts_with = "format")]
        output_dir: Option<PathBuf>,
    },
    /// List the catalog, optionally restricted to one category
    Browse {
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// Rotate through book titles like the home-screen carousel
    Carousel {
        #[arg(long, default_value = "all")]
        category: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("shelf_monitor=debug");

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let client = LibraryApiClient::new(config.library.api_url.clone(), &config.network)?;
    tracing::info!("API client initialized for {}", config.library.api_url);

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    match args.command {
        Command::Stats {
            user,
            top,
            format,
            output_dir,
        } => {
            let user_id = user
                .or(config.library.user_id)
                .context("No user given: pass --user or set library.user_id")?;
            let top_n = match top {
                Some(top) => usize::try_from(top).context("--top is too large")?,
                None => config.stats.top_n,
            };
            if top_n == 0 {
                return Err(StatsError::InvalidTopN(top_n)).context("Invalid stats.top_n");
            }
            rt.block_on(run_stats(&client, user_id, top_n, format, output_dir))
        }
        Command::Browse { category } => {
            rt.block_on(run_browse(&client, &config, CategoryFilter::parse(&category)))
        }
        Command::Carousel { category } => rt.block_on(run_carousel(
            &client,
            &config,
            CategoryFilter::parse(&category),
        )),
    }
}

async fn run_stats(
    client: &LibraryApiClient,
    user_id: i64,
    top_n: usize,
    format: OutputFormat,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let summary = match load_stats(client, user_id, top_n).await {
        StatsView::Ready(summary) => summary,
        other => {
            if let Some(msg) = other.message() {
                println!("{}", msg);
            }
            return Ok(());
        }
    };

    if let Some(dir) = output_dir {
        let path = export::export_csv(&summary, &dir, &SystemClock)?;
        println!("{}", path.display());
        return Ok(());
    }

    let stdout = io::stdout().lock();
    match format {
        OutputFormat::Text => export::write_text(&summary, stdout),
        OutputFormat::Json => export::write_json(&summary, stdout),
        OutputFormat::Csv => export::write_csv(&summary, stdout),
    }
}

async fn run_browse(
    client: &LibraryApiClient,
    config: &AppConfig,
    filter: CategoryFilter,
) -> Result<()> {
    if let CategoryFilter::Named(name) = &filter {
        if !config.browse.categories.contains(name) {
            tracing::warn!("Category {:?} is not in the configured picker list", name);
        }
    }

    let books = load_shelf(client).await;
    let shown = filter_books(&books, &filter);
    if shown.is_empty() {
        println!("No books to show.");
        return Ok(());
    }

    let popular_id = popular_book(&shown).map(|book| book.id);
    for book in &shown {
        let badge = if Some(book.id) == popular_id {
            " [popular]"
        } else {
            ""
        };
        println!(
            "{:>5}  {}{}  ({}/{} available)",
            book.id, book.title, badge, book.available_copies, book.total_copies
        );
    }
    println!("{}", ShelfSummary::of(&shown).describe(&filter));
    Ok(())
}

/// Rotate the carousel on one timer and refresh the catalog on another.
async fn run_carousel(
    client: &LibraryApiClient,
    config: &AppConfig,
    filter: CategoryFilter,
) -> Result<()> {
    tracing::info!("Starting carousel for {}", filter);

    let mut carousel = Carousel::new(filter);
    let mut books = load_shelf(client).await;

    let mut rotate = tokio::time::interval(Duration::from_secs(
        config.refresh.carousel_interval_secs.max(1),
    ));
    rotate.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut refresh = tokio::time::interval(Duration::from_secs(
        config.refresh.catalog_refresh_mins.max(1) * 60,
    ));
    refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // First ticks complete immediately; the catalog was just loaded.
    rotate.tick().await;
    refresh.tick().await;

    if let Some(book) = carousel.current(&books) {
        println!("{}", book.title);
    }

    loop {
        tokio::select! {
            _ = rotate.tick() => {
                match carousel.advance(&books) {
                    Some(book) => println!("{}", book.title),
                    None => tracing::debug!("No books to rotate"),
                }
            }
            _ = refresh.tick() => {
                books = load_shelf(client).await;
                carousel.reset();
                tracing::info!("Catalog refreshed: {} books", books.len());
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping carousel");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_top_must_be_positive() {
        let result = Args::try_parse_from(["shelf-monitor", "stats", "--user", "1", "--top", "0"]);
        assert!(result.is_err(), "--top 0 should be rejected");

        let result = Args::try_parse_from(["shelf-monitor", "stats", "--top", "-2"]);
        assert!(result.is_err(), "negative --top should be rejected");
    }

    #[test]
    fn test_stats_top_accepts_positive() {
        let args = Args::try_parse_from(["shelf-monitor", "stats", "--top", "5"]).unwrap();
        match args.command {
            Command::Stats { top, .. } => assert_eq!(top, Some(5)),
            other => panic!("expected stats, got {:?}", other),
        }
    }

    #[test]
    fn test_output_dir_conflicts_with_format() {
        let result = Args::try_parse_from([
            "shelf-monitor",
            "stats",
            "--format",
            "json",
            "--output-dir",
            "/tmp",
        ]);
        let err = result.expect_err("--format and --output-dir should conflict");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_output_dir_alone_is_accepted() {
        let args =
            Args::try_parse_from(["shelf-monitor", "stats", "--output-dir", "/tmp"]).unwrap();
        match args.command {
            Command::Stats {
                format, output_dir, ..
            } => {
                assert_eq!(format, OutputFormat::Text);
                assert_eq!(output_dir, Some(PathBuf::from("/tmp")));
            }
            other => panic!("expected stats, got {:?}", other),
        }
    }
}
