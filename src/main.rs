use std::collections::HashSet;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use portal_e2e::config::{Config, Portal};
use portal_e2e::orchestrator::SuiteRunner;
use portal_e2e::scenarios;
use portal_e2e::utils::logging;

#[derive(Parser)]
#[command(name = "portal-e2e")]
#[command(version)]
#[command(about = "End-to-end UI suite for the admin and partner portals", long_about = None)]
struct Cli {
    /// Print the scenario list instead of running it
    #[arg(long, default_value = "false")]
    list: bool,

    /// Only scenarios whose file, suite or name contains this text
    #[arg(short, long)]
    filter: Option<String>,

    /// Only scenarios for one portal (admin, partner)
    #[arg(short, long)]
    portal: Option<Portal>,

    /// Number of scenarios running at the same time
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let selected = scenarios::select(cli.filter.as_deref(), cli.portal);

    if cli.list {
        let files: HashSet<&str> = selected.iter().map(|def| def.file).collect();
        println!("Listing tests:");
        for def in &selected {
            println!("  {}", def.list_line());
        }
        println!("Total: {} tests in {} files", selected.len(), files.len());
        return Ok(());
    }

    if selected.is_empty() {
        warn!("⚠️ 没有匹配的场景，程序结束");
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(concurrency) = cli.concurrency {
        config.max_concurrent_scenarios = concurrency.max(1);
    }

    let runner = SuiteRunner::initialize(config).await?;
    let stats = runner.run(selected).await;
    runner.shutdown().await;

    if !stats?.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}
