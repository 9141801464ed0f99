use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blabz_common::{Config, PipelinePolicy};
use blabz_engine::guard::CooldownGuard;
use blabz_engine::pipeline::BlabzPipeline;
use blabz_engine::source::GuardedSource;
use blabz_store::{connect, migrate, PgAuthorStore, PgLedger, PgPostStore, PgProjectStore};
use x_client::XApiClient;

#[derive(Parser)]
#[command(name = "blabz", about = "Ingest and categorize an author's recent posts")]
struct Args {
    /// X handle to process (with or without the leading @).
    handle: Option<String>,

    /// Empty the evaluation ledger and exit (re-process after a rule change).
    #[arg(long)]
    clear_ledger: bool,

    /// Print the categorized feed as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("blabz=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    let policy = PipelinePolicy::default();

    let pool = connect(&config.database_url).await?;
    migrate(&pool).await?;

    let guard = Arc::new(CooldownGuard::new());
    let source = GuardedSource::new(
        XApiClient::new(config.x_bearer_token.clone()),
        guard,
        policy.cooldown(),
    );

    let pipeline = BlabzPipeline::new(
        Arc::new(source),
        Arc::new(PgAuthorStore::new(pool.clone())),
        Arc::new(PgProjectStore::new(pool.clone())),
        Arc::new(PgPostStore::new(pool.clone())),
        Arc::new(PgLedger::new(pool)),
        policy,
    );

    if args.clear_ledger {
        let removed = pipeline.clear_ledger().await?;
        info!(removed, "Ledger cleared");
        return Ok(());
    }

    let handle = args
        .handle
        .context("HANDLE is required unless --clear-ledger is set")?;
    let feed = pipeline.categorized_posts(&handle).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
    } else {
        if feed.degraded {
            println!("(degraded: served from cache, upstream rate limited)");
        }
        for (project, posts) in &feed.projects {
            println!("{project}: {} post(s)", posts.len());
            for post in posts {
                println!(
                    "  [{:>3}] {:.4} blabz  {}",
                    post.score,
                    post.reward_per_project,
                    truncate(&post.text, 70)
                );
            }
        }
    }

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}…")
    }
}
