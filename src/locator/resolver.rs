//! 元素定位器
//!
//! 按顺序尝试候选策略，返回第一个可见匹配；全部失败时按 [`Fallback`] 兜底。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::LocateError;
use crate::infrastructure::{Dom, Probe};
use crate::locator::{Fallback, Locator, Resolved};
use crate::utils::wait::{wait_for, wait_until, WaitConfig};

#[derive(Clone)]
pub struct Resolver {
    dom: Arc<dyn Dom>,
    wait: WaitConfig,
}

impl Resolver {
    pub fn new(dom: Arc<dyn Dom>, wait: WaitConfig) -> Self {
        Self { dom, wait }
    }

    pub fn wait_config(&self) -> WaitConfig {
        self.wait
    }

    /// 使用默认超时定位
    pub async fn resolve(&self, locator: &Locator) -> Result<Resolved, LocateError> {
        self.resolve_with(locator, &self.wait).await
    }

    /// 使用指定超时定位
    pub async fn resolve_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Resolved, LocateError> {
        self.resolve_with(locator, &self.wait.with_timeout(timeout))
            .await
    }

    async fn resolve_with(
        &self,
        locator: &Locator,
        wait: &WaitConfig,
    ) -> Result<Resolved, LocateError> {
        if let Some(found) = wait_until(wait, || self.first_visible(locator)).await {
            debug!("✓ 定位到 '{}' ({})", locator.name, found.strategy);
            return Ok(found);
        }

        match locator.fallback {
            Fallback::None => {}
            Fallback::DomAttached => {
                if let Some(found) = self.first_attached(locator).await {
                    warn!(
                        "⚠️ '{}' 没有可见匹配，使用已挂载的隐藏元素 ({})",
                        locator.name, found.strategy
                    );
                    return Ok(found);
                }
            }
            Fallback::ForceVisible => {
                if let Some(found) = self.first_attached(locator).await {
                    if let Err(e) = self.dom.force_visible(&found.strategy, found.index).await {
                        debug!("强制显示 '{}' 失败: {:#}", locator.name, e);
                    }
                    // 以重新探测的结果为准
                    let rechecked = self.dom.probe(&found.strategy).await;
                    if let Ok(Probe {
                        visible_index: Some(index),
                        ..
                    }) = rechecked
                    {
                        warn!(
                            "⚠️ '{}' 被强制设为可见 ({})",
                            locator.name, found.strategy
                        );
                        return Ok(Resolved {
                            index,
                            visible: true,
                            ..found
                        });
                    }
                    debug!("'{}' 强制显示后仍不可见", locator.name);
                }
            }
        }

        Err(LocateError::NotFound {
            element: locator.name.clone(),
            tried: locator.describe_candidates(),
            timeout_ms: wait.timeout_ms(),
        })
    }

    /// 一轮探测：按顺序返回第一个可见匹配
    ///
    /// 探测脚本出错（例如页面正在跳转）视为本轮无匹配。
    async fn first_visible(&self, locator: &Locator) -> Option<Resolved> {
        for strategy in &locator.candidates {
            match self.dom.probe(strategy).await {
                Ok(probe) => {
                    if let Some(index) = probe.visible_index {
                        return Some(Resolved {
                            element: locator.name.clone(),
                            strategy: strategy.clone(),
                            index,
                            visible: true,
                        });
                    }
                }
                Err(e) => debug!("探测 '{}' ({}) 失败: {:#}", locator.name, strategy, e),
            }
        }
        None
    }

    async fn first_attached(&self, locator: &Locator) -> Option<Resolved> {
        for strategy in &locator.candidates {
            if let Ok(probe) = self.dom.probe(strategy).await {
                if probe.attached > 0 {
                    return Some(Resolved {
                        element: locator.name.clone(),
                        strategy: strategy.clone(),
                        index: 0,
                        visible: false,
                    });
                }
            }
        }
        None
    }

    /// 查询：在超时内是否可见，从不返回错误
    pub async fn is_visible(&self, locator: &Locator, timeout: Duration) -> bool {
        let wait = self.wait.with_timeout(timeout);
        wait_until(&wait, || self.first_visible(locator))
            .await
            .is_some()
    }

    /// 等待元素的所有候选都不可见
    pub async fn wait_hidden(&self, locator: &Locator, timeout: Duration) -> Result<(), LocateError> {
        let wait = self.wait.with_timeout(timeout);
        let hidden = wait_for(&wait, || async { self.first_visible(locator).await.is_none() }).await;
        if hidden {
            Ok(())
        } else {
            Err(LocateError::StillVisible {
                element: locator.name.clone(),
                timeout_ms: wait.timeout_ms(),
            })
        }
    }
}
