//! 条件等待
//!
//! 所有"等一会儿再看"的地方都走这里：按固定间隔轮询一个条件，
//! 直到条件满足或超时，不使用固定时长的 sleep 作为同步手段。

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// 默认超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 等待策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// 保留轮询间隔，替换超时
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// 轮询 `probe` 直到返回 `Some`，超时返回 `None`
///
/// 至少探测一次；截止时刻之后还会再做最后一次探测，
/// 避免条件恰好在最后一个间隔内满足时被漏掉。
pub async fn wait_until<T, F, Fut>(config: &WaitConfig, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + config.timeout;
    loop {
        if let Some(value) = probe().await {
            return Some(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        sleep(config.poll_interval.min(deadline - now)).await;
    }
}

/// 布尔条件版本的 [`wait_until`]
pub async fn wait_for<F, Fut>(config: &WaitConfig, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    wait_until(config, || {
        let fut = condition();
        async move { fut.await.then_some(()) }
    })
    .await
    .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn quick(timeout_ms: u64) -> WaitConfig {
        WaitConfig::new(Duration::from_millis(timeout_ms), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn returns_first_satisfied_value() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let value = wait_until(&quick(1_000), || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { (n >= 3).then_some(n) }
        })
        .await;

        assert_eq!(value, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn times_out_with_none_after_probing_at_least_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let started = Instant::now();
        let value: Option<()> = wait_until(&quick(40), || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { None }
        })
        .await;

        assert!(value.is_none());
        assert!(started.elapsed() >= Duration::from_millis(40));
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn zero_timeout_still_probes_once() {
        assert!(wait_for(&quick(0), || async { true }).await);
        assert!(!wait_for(&quick(0), || async { false }).await);
    }

    #[test]
    fn polls_on_a_blocking_runtime() {
        let calls = AtomicUsize::new(0);
        let found = tokio_test::block_on(wait_for(&quick(500), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { n == 2 }
        }));

        assert!(found);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
