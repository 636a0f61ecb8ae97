//! 浏览器会话
//!
//! 配置了调试端口时连接已打开的浏览器，否则自行启动。
//! 事件处理循环跑在后台任务里；每个场景通过 [`BrowserSession::new_page`] 拿到独立的页面。

pub mod connection;
pub mod headless;

use std::sync::Arc;

use chromiumoxide::handler::Handler;
use chromiumoxide::Browser;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{Config, Portal};
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::JsExecutor;
use crate::pages::PageContext;

pub use connection::connect_to_browser;
pub use headless::launch_browser;

/// 在后台处理浏览器事件，出错即停止
pub(crate) fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("浏览器事件循环结束: {}", e);
                break;
            }
        }
    })
}

pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 连接的是外部浏览器时不关闭它
    owned: bool,
}

impl BrowserSession {
    pub async fn start(config: &Config) -> AppResult<Self> {
        let (browser, handler, owned) = match config.browser_debug_port {
            Some(port) => {
                let (browser, handler) = connect_to_browser(port).await?;
                (browser, handler, false)
            }
            None => {
                let (browser, handler) = launch_browser(config).await?;
                (browser, handler, true)
            }
        };
        Ok(Self {
            browser,
            handler,
            owned,
        })
    }

    /// 打开一个新标签页
    pub async fn new_page(&self) -> AppResult<JsExecutor> {
        let page = self.browser.new_page("about:blank").await.map_err(|e| {
            AppError::Browser(BrowserError::PageCreationFailed {
                source: Box::new(e),
            })
        })?;
        Ok(JsExecutor::new(page))
    }

    /// 新标签页包装成页面对象上下文
    pub async fn new_context(&self, config: Arc<Config>, portal: Portal) -> AppResult<PageContext> {
        let executor = self.new_page().await?;
        Ok(PageContext::new(Arc::new(executor), config, portal))
    }

    pub async fn close(mut self) {
        if self.owned {
            if let Err(e) = self.browser.close().await {
                warn!("⚠️ 关闭浏览器失败: {}", e);
            }
            let _ = self.browser.wait().await;
        }
        self.handler.abort();
    }
}
