//! 页面对象层
//!
//! 每个页面对象持有一份 [`PageContext`]，用定位器描述元素，对外暴露语义化操作。
//!
//! 约定：
//! - 变更类操作（`click_*` / `enter_*` / `select_*` / `open`）失败时返回错误，场景随之失败
//! - 查询类操作（`is_*` / `get_*`）吞掉内部错误，返回 `false` / 空值

pub mod components;
pub mod dashboard;
pub mod forgot_password;
pub mod login;
pub mod reset_password;
pub mod subscription;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::{Config, Portal, PortalConfig};
use crate::infrastructure::Dom;
use crate::locator::{Locator, Resolved, Resolver};
use crate::utils::wait::{wait_for, WaitConfig};

pub use dashboard::DashboardPage;
pub use forgot_password::ForgotPasswordPage;
pub use login::LoginPage;
pub use reset_password::ResetPasswordPage;
pub use subscription::SubscriptionPage;

/// 页面对象共享的上下文：DOM 驱动、定位器与配置
#[derive(Clone)]
pub struct PageContext {
    dom: Arc<dyn Dom>,
    resolver: Resolver,
    config: Arc<Config>,
    portal: Portal,
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("portal", &self.portal)
            .field("url", &self.portal_config().url)
            .finish_non_exhaustive()
    }
}

impl PageContext {
    pub fn new(dom: Arc<dyn Dom>, config: Arc<Config>, portal: Portal) -> Self {
        let resolver = Resolver::new(dom.clone(), config.element_wait());
        Self {
            dom,
            resolver,
            config,
            portal,
        }
    }

    pub fn dom(&self) -> &dyn Dom {
        self.dom.as_ref()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn portal(&self) -> Portal {
        self.portal
    }

    pub fn portal_config(&self) -> &PortalConfig {
        self.config.portal(self.portal)
    }

    /// 同一个页面，切换到另一个门户的配置
    pub fn for_portal(&self, portal: Portal) -> Self {
        Self {
            portal,
            ..self.clone()
        }
    }

    fn query_timeout(&self) -> Duration {
        self.config.query_wait().timeout
    }

    // ========== 变更类操作 ==========

    /// 定位（必须可见）
    pub async fn locate(&self, locator: &Locator) -> Result<Resolved> {
        Ok(self.resolver.resolve(locator).await?)
    }

    /// 定位 → 点击 → 等待页面稳定
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        let target = self.locate(locator).await?;
        self.dom
            .click(&target)
            .await
            .with_context(|| format!("点击 '{}' 失败", locator.name))?;
        debug!("已点击 '{}'", locator.name);
        self.wait_for_settle().await;
        Ok(())
    }

    /// 定位 → 填写 → 等待页面稳定
    pub async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        let target = self.locate(locator).await?;
        self.dom
            .fill(&target, value)
            .await
            .with_context(|| format!("填写 '{}' 失败", locator.name))?;
        debug!("已填写 '{}'", locator.name);
        self.wait_for_settle().await;
        Ok(())
    }

    pub async fn press(&self, locator: &Locator, key: &str) -> Result<()> {
        let target = self.locate(locator).await?;
        self.dom
            .press_key(&target, key)
            .await
            .with_context(|| format!("在 '{}' 上按键 {} 失败", locator.name, key))?;
        self.wait_for_settle().await;
        Ok(())
    }

    /// 导航到当前门户内的路由
    pub async fn navigate(&self, path: &str) -> Result<()> {
        let url = self.portal_config().route(path);
        self.dom
            .goto(&url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        self.wait_for_settle().await;
        Ok(())
    }

    /// 等待页面稳定；超时只记录日志，不视为失败
    pub async fn wait_for_settle(&self) -> bool {
        let settled = wait_for(&self.config.settle_wait(), || async {
            self.dom.is_settled().await.unwrap_or(false)
        })
        .await;
        if !settled {
            debug!("页面在 {}ms 内未稳定", self.config.settle_timeout_ms);
        }
        settled
    }

    // ========== 查询类操作 ==========

    pub async fn is_visible(&self, locator: &Locator) -> bool {
        self.resolver.is_visible(locator, self.query_timeout()).await
    }

    pub async fn is_visible_within(&self, locator: &Locator, timeout: Duration) -> bool {
        self.resolver.is_visible(locator, timeout).await
    }

    /// 元素文本，找不到时返回空字符串
    pub async fn text_of(&self, locator: &Locator) -> String {
        let result: Result<String> = async {
            let target = self
                .resolver
                .resolve_within(locator, self.query_timeout())
                .await?;
            self.dom.text(&target).await
        }
        .await;
        result.unwrap_or_else(|e| {
            debug!("读取 '{}' 文本失败: {:#}", locator.name, e);
            String::new()
        })
    }

    /// 输入框当前值，找不到时返回空字符串
    pub async fn value_of(&self, locator: &Locator) -> String {
        let result: Result<String> = async {
            let target = self
                .resolver
                .resolve_within(locator, self.query_timeout())
                .await?;
            self.dom.value(&target).await
        }
        .await;
        result.unwrap_or_default()
    }

    pub async fn attribute_of(&self, locator: &Locator, name: &str) -> Option<String> {
        let target = self
            .resolver
            .resolve_within(locator, self.query_timeout())
            .await
            .ok()?;
        self.dom.attribute(&target, name).await.ok().flatten()
    }

    pub async fn is_enabled(&self, locator: &Locator) -> bool {
        match self
            .resolver
            .resolve_within(locator, self.query_timeout())
            .await
        {
            Ok(target) => self.dom.is_enabled(&target).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// 第一个有可见匹配的候选下所有元素的文本
    pub async fn texts(&self, locator: &Locator) -> Vec<String> {
        for strategy in &locator.candidates {
            match self.dom.texts(strategy).await {
                Ok(texts) if !texts.is_empty() => return texts,
                Ok(_) => {}
                Err(e) => debug!("读取 '{}' 列表失败 ({}): {:#}", locator.name, strategy, e),
            }
        }
        Vec::new()
    }

    /// 在超时内等待某个候选出现可见文本
    pub async fn wait_for_texts(&self, locator: &Locator, wait: &WaitConfig) -> Vec<String> {
        crate::utils::wait::wait_until(wait, || async {
            let texts = self.texts(locator).await;
            (!texts.is_empty()).then_some(texts)
        })
        .await
        .unwrap_or_default()
    }

    pub async fn current_url(&self) -> String {
        self.dom.current_url().await.unwrap_or_default()
    }

    /// 等待 URL 满足条件
    pub async fn wait_for_url(&self, timeout: Duration, predicate: impl Fn(&str) -> bool + Send + Sync) -> bool {
        let wait = self.config.element_wait().with_timeout(timeout);
        wait_for(&wait, || async { predicate(&self.current_url().await) }).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::infrastructure::fake::FakeDom;

    /// 使用很短超时的测试上下文
    pub fn context(dom: Arc<FakeDom>) -> PageContext {
        let config = Config {
            element_timeout_ms: 60,
            query_timeout_ms: 30,
            toast_timeout_ms: 60,
            settle_timeout_ms: 30,
            poll_interval_ms: 5,
            ..Config::default()
        };
        PageContext::new(dom, Arc::new(config), Portal::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::context;
    use super::*;
    use crate::infrastructure::fake::{FakeDom, FakeElement};
    use crate::locator::Strategy;

    #[tokio::test]
    async fn queries_return_neutral_values_when_nothing_matches() {
        let dom = Arc::new(FakeDom::new());
        let ctx = context(dom);
        let missing = Locator::new("missing").css("#missing");

        assert!(!ctx.is_visible(&missing).await);
        assert_eq!(ctx.text_of(&missing).await, "");
        assert_eq!(ctx.attribute_of(&missing, "class").await, None);
        assert!(!ctx.is_enabled(&missing).await);
        assert!(ctx.texts(&missing).await.is_empty());
    }

    #[tokio::test]
    async fn reads_input_value_and_enabled_state() {
        let dom = Arc::new(FakeDom::new());
        dom.add(Strategy::css("#licenses"), FakeElement::visible("").with_value("25"));
        dom.add(Strategy::css("#save"), FakeElement::visible("Save").disabled());
        let ctx = context(dom);

        assert_eq!(ctx.value_of(&Locator::new("licenses").css("#licenses")).await, "25");
        assert!(!ctx.is_enabled(&Locator::new("save").css("#save")).await);
    }

    #[test]
    fn debug_names_portal_and_base_url() {
        let ctx = context(Arc::new(FakeDom::new()));
        let shown = format!("{:?}", ctx);
        assert!(shown.contains("Admin"));
        assert!(shown.contains(&Config::default().admin.url));
    }

    #[tokio::test]
    async fn queries_swallow_script_failures() {
        let dom = Arc::new(FakeDom::new());
        dom.add(Strategy::css("#error"), FakeElement::visible("Email is required"));
        dom.fail_all();
        let ctx = context(dom);
        let error = Locator::new("error").css("#error");

        assert!(!ctx.is_visible(&error).await);
        assert_eq!(ctx.text_of(&error).await, "");
        assert_eq!(ctx.current_url().await, "");
    }

    #[tokio::test]
    async fn mutations_fail_loudly_when_element_is_missing() {
        let dom = Arc::new(FakeDom::new());
        let ctx = context(dom);
        let button = Locator::new("submit button").css("button[type='submit']");

        let err = ctx.click(&button).await.unwrap_err();
        assert!(err.to_string().contains("submit button"));
        assert!(ctx.fill(&button, "x").await.is_err());
    }

    #[tokio::test]
    async fn navigate_joins_portal_route() {
        let dom = Arc::new(FakeDom::new());
        let ctx = context(dom.clone());

        ctx.navigate("/subscriptions").await.unwrap();

        assert_eq!(
            ctx.current_url().await,
            format!("{}/subscriptions", Config::default().admin.url)
        );
    }

    #[tokio::test]
    async fn settle_waits_until_page_reports_stable() {
        let dom = Arc::new(FakeDom::new());
        dom.unsettled_for(2);
        let ctx = context(dom);
        assert!(ctx.wait_for_settle().await);
    }
}
