//! 下拉选择组件
//!
//! 点击触发器 → 轮询等待浮层面板 → 点击选项 → 等待面板关闭。
//! 面板没有按时出现时重新点击一次触发器。

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::locator::{Locator, Strategy};
use crate::pages::PageContext;

const PANEL_CSS: [&str; 6] = [
    ".cdk-overlay-pane [role='listbox']",
    ".mat-mdc-select-panel",
    ".ng-dropdown-panel",
    ".dropdown-menu.show",
    "ul[role='listbox']",
    "[role='listbox']",
];

const OPTION_SCOPE: &str =
    "mat-option, [role='option'], .ng-option, .dropdown-item, li[role='option'], option";

#[derive(Debug, Clone)]
pub struct Dropdown {
    trigger: Locator,
}

pub fn panel_locator() -> Locator {
    PANEL_CSS
        .iter()
        .fold(Locator::new("dropdown panel"), |loc, css| loc.css(*css))
}

pub fn option_locator(option: &str) -> Locator {
    Locator::new(format!("dropdown option '{}'", option))
        .with(Strategy::exact_text_in(OPTION_SCOPE, option))
        .with(Strategy::text_in(OPTION_SCOPE, option))
        .role_named("option", option)
}

impl Dropdown {
    pub fn new(trigger: Locator) -> Self {
        Self { trigger }
    }

    /// 打开下拉并等待面板出现，失败时重试一次点击
    pub async fn open(&self, ctx: &PageContext) -> Result<()> {
        let panel = panel_locator();
        let half = ctx.resolver().wait_config().timeout / 2;
        for attempt in 1..=2 {
            ctx.click(&self.trigger).await?;
            if ctx.is_visible_within(&panel, half).await {
                debug!("'{}' 面板已打开 (第 {} 次)", self.trigger.name, attempt);
                return Ok(());
            }
            warn!("⚠️ '{}' 面板未出现，重试点击", self.trigger.name);
        }
        bail!("'{}' 的下拉面板没有出现", self.trigger.name)
    }

    /// 选择指定文本的选项
    pub async fn select(&self, ctx: &PageContext, option: &str) -> Result<()> {
        // 原生 <select> 直接赋值
        if self.is_native_select(ctx).await {
            ctx.fill(&self.trigger, option)
                .await
                .with_context(|| format!("为 '{}' 选择 '{}' 失败", self.trigger.name, option))?;
            info!("✓ {} = {}", self.trigger.name, option);
            return Ok(());
        }

        self.open(ctx).await?;
        ctx.click(&option_locator(option))
            .await
            .with_context(|| format!("'{}' 中没有选项 '{}'", self.trigger.name, option))?;
        // 多选面板不会自动关闭，不视为失败
        let panel = panel_locator();
        if ctx
            .resolver()
            .wait_hidden(&panel, ctx.config().query_wait().timeout)
            .await
            .is_err()
        {
            debug!("'{}' 面板选择后仍然打开", self.trigger.name);
        }
        info!("✓ {} = {}", self.trigger.name, option);
        Ok(())
    }

    /// 当前显示的值（查询）
    pub async fn selected_text(&self, ctx: &PageContext) -> String {
        ctx.text_of(&self.trigger).await
    }

    async fn is_native_select(&self, ctx: &PageContext) -> bool {
        match ctx.locate(&self.trigger).await {
            Ok(target) => matches!(
                &target.strategy,
                Strategy::Css { value } if value.trim_start().starts_with("select")
            ),
            Err(_) => false,
        }
    }
}
