//! autotune-reviewer - Main entry point
//!
//! Usage:
//!
//! ```text
//! autotune-reviewer                 # site layout (scripts/input.csv -> data/posts/)
//! autotune-reviewer --standalone    # standalone layout (input.csv -> output/)
//! autotune-reviewer config.json     # explicit JSON configuration
//! autotune-reviewer --list          # list published posts, newest first
//! ```
//!
//! `OPENAI_API_KEY` overrides any key in the configuration. Log verbosity
//! follows `RUST_LOG`.

use autotune_reviewer::{Config, Pipeline, PostIndex, RunSummary};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autotune_reviewer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--list") {
        let config = load_config(args.get(1).map(String::as_str))?;
        return list_posts(&PostIndex::from_config(&config.output)).await;
    }

    let config = load_config(args.first().map(String::as_str))?.with_env();

    info!(
        dataset = %config.dataset.path.display(),
        output = %config.output.dir.display(),
        layout = ?config.output.layout,
        "starting autotune-reviewer"
    );

    let pipeline = Pipeline::new(config)?;
    let summary = pipeline.run().await?;

    print_summary(&summary);
    Ok(())
}

fn load_config(arg: Option<&str>) -> autotune_reviewer::Result<Config> {
    match arg {
        None => Ok(Config::site()),
        Some("--standalone") => Ok(Config::standalone()),
        Some(path) => Config::from_file(path),
    }
}

async fn list_posts(index: &PostIndex) -> Result<(), Box<dyn std::error::Error>> {
    let posts = index.sorted().await?;
    if posts.is_empty() {
        println!("No posts in {}.", index.dir().display());
        return Ok(());
    }
    for post in posts {
        println!("{}  {:<12} {}", post.created_at, post.id, post.title);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if summary.pending == 0 {
        println!("No pending records.");
        return;
    }

    println!("==================================================");
    println!("Processed: {} / {}", summary.processed.len(), summary.pending);
    for skipped in &summary.skipped {
        println!("Skipped:   {} ({})", skipped.id, skipped.reason);
    }
    if summary.committed {
        println!("Dataset updated.");
    }
    println!("==================================================");
}
