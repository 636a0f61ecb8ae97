use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use portal_e2e::exporter::{self, DEFAULT_LIST_COMMAND};
use portal_e2e::utils::logging;

#[derive(Parser)]
#[command(name = "export-tests")]
#[command(version)]
#[command(about = "Export the scenario list to a CSV of test cases", long_about = None)]
struct Cli {
    /// Saved listing to parse instead of running the list command
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Command whose output lists the tests
    #[arg(short, long, default_value = DEFAULT_LIST_COMMAND)]
    command: String,

    /// CSV file to write
    #[arg(short, long, default_value = "test-cases.csv")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let listing = match &cli.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("无法读取列表文件: {}", path.display()))?,
        None => exporter::run_list_command(&cli.command).await?,
    };

    let tests = exporter::parse_list_output(&listing);
    if tests.is_empty() {
        warn!("⚠️ 列表输出中没有识别到任何用例");
    }
    exporter::write_csv(&cli.output, &tests)?;
    exporter::print_summary(&tests, &cli.output);
    Ok(())
}
