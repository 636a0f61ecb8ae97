//! 仪表盘：统计卡片、筛选条件与图表

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::locator::{Locator, Strategy};
use crate::pages::components::Dropdown;
use crate::pages::PageContext;

pub const DASHBOARD_ROUTE: &str = "/dashboard";

const STAT_CARD_CSS: &str = ".stat-card, .dashboard-card, .summary-card, mat-card.stat";
const STAT_TITLE_CSS: &str =
    ".stat-card .card-title, .dashboard-card .card-title, .summary-card .title, .stat-card h4, .dashboard-card h4";
const GRAPH_CARD_CSS: &str = ".chart-card, .graph-card, .chart-container, mat-card:has(canvas), mat-card:has(svg)";
const GRAPH_TITLE_CSS: &str = ".chart-title, .graph-title, .chart-card mat-card-title, .chart-card h4, .graph-card h4";
const FILTER_CHIP_SCOPE: &str =
    "button, mat-chip, mat-chip-option, mat-button-toggle, .filter-chip, .btn-group label, [role='tab']";

/// 标记"已选中"的 class 片段
const ACTIVE_CLASSES: [&str; 6] = [
    "active",
    "selected",
    "mat-mdc-chip-selected",
    "mat-button-toggle-checked",
    "mat-mdc-tab-active",
    "is-checked",
];

pub struct DashboardPage {
    ctx: PageContext,
}

impl DashboardPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    pub fn ctx(&self) -> &PageContext {
        &self.ctx
    }

    fn container() -> Locator {
        Locator::new("dashboard")
            .css("app-dashboard")
            .css(".dashboard-container")
            .css(STAT_CARD_CSS)
            .with(Strategy::text_in("h1, h2, h3", "Dashboard"))
    }

    fn stat_card_value(title: &str) -> Locator {
        Locator::new(format!("stat card value '{}'", title))
            .xpath(format!(
                "//*[contains(@class,'card')][.//*[contains(normalize-space(.), '{title}')]]//*[contains(@class,'value') or contains(@class,'count') or contains(@class,'amount')]"
            ))
            .xpath(format!(
                "//*[contains(@class,'card')][.//*[contains(normalize-space(.), '{title}')]]//h2"
            ))
    }

    fn date_range_dropdown() -> Dropdown {
        Dropdown::new(
            Locator::new("date range dropdown")
                .css("mat-select[formcontrolname='dateRange']")
                .css("select[name='dateRange']")
                .css("[data-filter='date-range']")
                .label("Date Range"),
        )
    }

    fn partner_dropdown() -> Dropdown {
        Dropdown::new(
            Locator::new("partner filter dropdown")
                .css("mat-select[formcontrolname='partner']")
                .css("select[name='partner']")
                .css("ng-select[formcontrolname='partner']")
                .label("Partner"),
        )
    }

    fn filter_chip(label: &str) -> Locator {
        Locator::new(format!("filter '{}'", label))
            .with(Strategy::exact_text_in(FILTER_CHIP_SCOPE, label))
            .with(Strategy::text_in(FILTER_CHIP_SCOPE, label))
    }

    fn apply_button() -> Locator {
        Locator::new("apply filters button")
            .role_named("button", "Apply")
            .role_named("button", "Filter")
            .css("button.apply-filter")
    }

    fn clear_button() -> Locator {
        Locator::new("clear filters button")
            .role_named("button", "Clear")
            .role_named("button", "Reset")
            .css("button.clear-filter")
    }

    fn graph_card(title: &str) -> Locator {
        Locator::new(format!("graph '{}'", title)).with(Strategy::text_in(GRAPH_CARD_CSS, title))
    }

    // ========== 操作 ==========

    pub async fn open(&self) -> Result<()> {
        self.ctx.navigate(DASHBOARD_ROUTE).await?;
        self.ctx
            .locate(&Self::container())
            .await
            .context("仪表盘没有加载")?;
        Ok(())
    }

    /// 选择日期范围：页面上有同名快捷按钮时直接点击，否则走下拉框
    pub async fn select_date_range(&self, range: &str) -> Result<()> {
        let chip = Self::filter_chip(range);
        if self.ctx.is_visible(&chip).await {
            self.ctx.click(&chip).await?;
        } else {
            Self::date_range_dropdown().select(&self.ctx, range).await?;
        }
        info!("📅 日期范围: {}", range);
        Ok(())
    }

    pub async fn select_partner_filter(&self, partner: &str) -> Result<()> {
        Self::partner_dropdown().select(&self.ctx, partner).await
    }

    pub async fn apply_filters(&self) -> Result<()> {
        self.ctx.click(&Self::apply_button()).await
    }

    pub async fn clear_filters(&self) -> Result<()> {
        self.ctx.click(&Self::clear_button()).await
    }

    // ========== 查询 ==========

    pub async fn is_loaded(&self) -> bool {
        self.ctx.is_visible(&Self::container()).await
    }

    /// 部分仪表盘选择后立即生效，没有"应用"按钮
    pub async fn is_apply_button_visible(&self) -> bool {
        self.ctx.is_visible(&Self::apply_button()).await
    }

    pub async fn get_stat_card_titles(&self) -> Vec<String> {
        let wait = self.ctx.config().element_wait();
        self.ctx
            .wait_for_texts(&Locator::new("stat card titles").css(STAT_TITLE_CSS), &wait)
            .await
    }

    pub async fn get_stat_card_value(&self, title: &str) -> String {
        self.ctx.text_of(&Self::stat_card_value(title)).await
    }

    /// 筛选项是否处于选中状态
    ///
    /// 只认 `aria-selected` / `aria-pressed` / `aria-checked`、`checked` 属性与选中类名；
    /// 是否带 `style` 属性与选中无关。下拉框当前显示值等于该选项时同样视为已选中。
    pub async fn is_filter_applied(&self, label: &str) -> bool {
        let chip = Self::filter_chip(label);
        let Ok(target) = self
            .ctx
            .resolver()
            .resolve_within(&chip, self.ctx.config().query_wait().timeout)
            .await
        else {
            return self.dropdown_shows(label).await;
        };

        let mut attrs = Vec::new();
        for name in ["aria-selected", "aria-pressed", "aria-checked", "checked", "class"] {
            if let Ok(Some(value)) = self.ctx.dom().attribute(&target, name).await {
                attrs.push((name, value));
            }
        }
        let active = is_active_state(&attrs);
        debug!("筛选项 '{}' 状态: {:?} → {}", label, attrs, active);
        active
    }

    async fn dropdown_shows(&self, label: &str) -> bool {
        let want = label.trim().to_lowercase();
        for dropdown in [Self::date_range_dropdown(), Self::partner_dropdown()] {
            let shown = dropdown.selected_text(&self.ctx).await.to_lowercase();
            if !shown.is_empty() && shown.contains(&want) {
                return true;
            }
        }
        false
    }

    pub async fn get_graph_titles(&self) -> Vec<String> {
        let wait = self.ctx.config().element_wait();
        self.ctx
            .wait_for_texts(&Locator::new("graph titles").css(GRAPH_TITLE_CSS), &wait)
            .await
    }

    pub async fn is_graph_visible(&self, title: &str) -> bool {
        self.ctx.is_visible(&Self::graph_card(title)).await
    }

    /// 图表容器内已有 canvas 或 svg 内容
    pub async fn is_graph_rendered(&self, title: &str) -> bool {
        let timeout = self.ctx.config().element_wait().timeout;
        let Ok(target) = self
            .ctx
            .resolver()
            .resolve_within(&Self::graph_card(title), timeout)
            .await
        else {
            return false;
        };
        match self.ctx.dom().child_count(&target, "canvas, svg").await {
            Ok(count) => count > 0,
            Err(e) => {
                debug!("读取图表 '{}' 内容失败: {:#}", title, e);
                false
            }
        }
    }
}

/// 根据属性判断筛选项是否选中
fn is_active_state(attrs: &[(&str, String)]) -> bool {
    attrs.iter().any(|(name, value)| match *name {
        "aria-selected" | "aria-pressed" | "aria-checked" => value.eq_ignore_ascii_case("true"),
        "checked" => !value.eq_ignore_ascii_case("false"),
        "class" => value
            .split_whitespace()
            .any(|class| ACTIVE_CLASSES.contains(&class)),
        _ => false,
    })
}
