use chromiumoxide::{Browser, BrowserConfig};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::browser::spawn_handler;
use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};

/// 自行启动浏览器（默认无头）
pub async fn launch_browser(config: &Config) -> AppResult<(Browser, JoinHandle<()>)> {
    info!(
        "🚀 启动{}浏览器...",
        if config.headless { "无头" } else { "有界面" }
    );

    let mut builder = BrowserConfig::builder()
        .window_size(1440, 900)
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
        ]);
    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = &config.chrome_executable {
        debug!("浏览器路径: {}", path.display());
        builder = builder.chrome_executable(path);
    }

    let browser_config = builder.build().map_err(|message| {
        error!("配置浏览器失败: {}", message);
        AppError::Browser(BrowserError::ConfigurationFailed { message })
    })?;

    let (browser, handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::browser_launch_failed(e)
    })?;
    debug!("浏览器启动成功");

    Ok((browser, spawn_handler(handler)))
}
