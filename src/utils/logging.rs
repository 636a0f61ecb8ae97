/// 日志工具模块
///
/// 提供日志初始化以及运行摘要的格式化输出
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::scenarios::ScenarioResult;

/// 初始化 tracing 订阅者
///
/// 默认级别为 `info`，可通过 `RUST_LOG` 覆盖。重复调用是安全的（测试中会多次调用）。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化运行摘要文件
pub fn init_summary_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("无法创建目录: {}", parent.display()))?;
    }
    let header = format!(
        "{}\n端到端测试运行日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(path, header).with_context(|| format!("无法写入摘要文件: {}", path.display()))?;
    Ok(())
}

/// 追加一条场景结果到运行摘要文件
pub fn append_result(path: &Path, result: &ScenarioResult) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("无法打开摘要文件: {}", path.display()))?;
    writeln!(file, "{}", result.summary_line())?;
    for note in &result.diagnostics {
        writeln!(file, "    - {}", note)?;
    }
    if let Some(err) = &result.error {
        writeln!(file, "    ! {}", err)?;
    }
    Ok(())
}

/// 记录运行启动信息
pub fn log_startup(total: usize, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 端到端测试启动");
    info!("📋 待运行场景: {}", total);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录单个场景开始
pub fn log_scenario_start(index: usize, total: usize, suite: &str, name: &str) {
    info!("\n{}", "─".repeat(60));
    info!("▶️ [{}/{}] {} › {}", index, total, suite, name);
}

/// 记录单个场景结果
pub fn log_scenario_result(result: &ScenarioResult) {
    if result.passed {
        info!("✅ {} ({} ms)", result.name, result.duration.as_millis());
    } else {
        error!(
            "❌ {} ({} ms): {}",
            result.name,
            result.duration.as_millis(),
            result.error.as_deref().unwrap_or("未知错误")
        );
    }
}

/// 打印最终统计信息
pub fn print_final_stats(passed: usize, failed: usize, total: usize, summary_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部场景运行完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 通过: {}/{}", passed, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n摘要已保存至: {}", summary_path.display());
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
