//! 订阅管理页：列表、搜索、新增/编辑弹窗、删除确认

use anyhow::{Context, Result};
use tracing::info;

use crate::locator::{Locator, Strategy};
use crate::models::{SubscriptionForm, TableRow, Toast};
use crate::pages::components::{modal, toast, DataTable, Dropdown};
use crate::pages::PageContext;

pub const SUBSCRIPTION_ROUTE: &str = "/subscriptions";

const FORM_ERROR_CSS: &str =
    "mat-dialog-container mat-error, .modal.show .invalid-feedback, [role='dialog'] .error-message";

pub struct SubscriptionPage {
    ctx: PageContext,
    table: DataTable,
}

impl SubscriptionPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            table: DataTable::default(),
        }
    }

    pub fn ctx(&self) -> &PageContext {
        &self.ctx
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    // ========== 定位器 ==========

    fn heading() -> Locator {
        Locator::new("subscriptions heading")
            .css("app-subscription-list")
            .css("app-subscriptions")
            .with(Strategy::text_in("h1, h2, h3, .page-title", "Subscription"))
    }

    fn add_button() -> Locator {
        Locator::new("add subscription button")
            .role_named("button", "Add Subscription")
            .role_named("button", "New Subscription")
            .role_named("button", "Create")
            .css("button.add-subscription")
    }

    fn dropdown(control: &str, label: &str) -> Dropdown {
        Dropdown::new(
            Locator::new(format!("{} dropdown", label.to_lowercase()))
                .css(format!("mat-select[formcontrolname='{}']", control))
                .css(format!("ng-select[formcontrolname='{}']", control))
                .css(format!("select[formcontrolname='{}']", control))
                .label(label),
        )
    }

    fn start_date_input() -> Locator {
        Locator::new("start date input")
            .css("input[formcontrolname='startDate']")
            .css("input[type='date']")
            .placeholder("Start Date")
            .label("Start Date")
    }

    fn licenses_input() -> Locator {
        Locator::new("licenses input")
            .css("input[formcontrolname='licenses']")
            .css("input[formcontrolname='quantity']")
            .placeholder("Licenses")
            .label("Number of Licenses")
    }

    fn save_button() -> Locator {
        Locator::new("save subscription button")
            .with(Strategy::text_in("mat-dialog-container button, .modal.show button", "Save"))
            .with(Strategy::text_in("mat-dialog-container button, .modal.show button", "Submit"))
            .css("mat-dialog-container button[type='submit']")
            .role_named("button", "Save")
    }

    fn cancel_button() -> Locator {
        Locator::new("cancel button")
            .with(Strategy::text_in("mat-dialog-container button, .modal.show button", "Cancel"))
            .css("button[mat-dialog-close]")
            .role_named("button", "Cancel")
    }

    fn search_input() -> Locator {
        Locator::new("subscription search input")
            .css("input[type='search']")
            .css("input[formcontrolname='search']")
            .placeholder("Search")
    }

    fn clear_search_button() -> Locator {
        Locator::new("clear search button")
            .css("button[aria-label='Clear']")
            .css(".search-clear")
            .role_named("button", "Clear")
    }

    fn confirm_delete_button() -> Locator {
        Locator::new("confirm delete button")
            .with(Strategy::text_in("mat-dialog-container button, .swal2-confirm, .modal.show button", "Delete"))
            .with(Strategy::text_in("mat-dialog-container button, .modal.show button", "Yes"))
            .css(".swal2-confirm")
            .role_named("button", "Confirm")
    }

    // ========== 操作 ==========

    pub async fn open(&self) -> Result<()> {
        self.ctx.navigate(SUBSCRIPTION_ROUTE).await?;
        self.ctx
            .locate(&Self::heading())
            .await
            .context("订阅列表页没有加载")?;
        Ok(())
    }

    pub async fn click_add_subscription(&self) -> Result<()> {
        self.ctx.click(&Self::add_button()).await?;
        modal::wait_open(&self.ctx)
            .await
            .context("新增订阅弹窗没有打开")
    }

    pub async fn select_customer(&self, customer: &str) -> Result<()> {
        Self::dropdown("customer", "Customer").select(&self.ctx, customer).await
    }

    pub async fn select_plan(&self, plan: &str) -> Result<()> {
        Self::dropdown("plan", "Plan").select(&self.ctx, plan).await
    }

    pub async fn select_billing_cycle(&self, cycle: &str) -> Result<()> {
        Self::dropdown("billingCycle", "Billing Cycle")
            .select(&self.ctx, cycle)
            .await
    }

    pub async fn enter_start_date(&self, date: &str) -> Result<()> {
        self.ctx.fill(&Self::start_date_input(), date).await
    }

    pub async fn enter_licenses(&self, licenses: u32) -> Result<()> {
        self.ctx
            .fill(&Self::licenses_input(), &licenses.to_string())
            .await
    }

    /// 按表单中给出的字段依次填写，未给出的字段保持不变
    pub async fn fill_form(&self, form: &SubscriptionForm) -> Result<()> {
        if let Some(customer) = &form.customer {
            self.select_customer(customer).await?;
        }
        if let Some(plan) = &form.plan {
            self.select_plan(plan).await?;
        }
        if let Some(cycle) = &form.billing_cycle {
            self.select_billing_cycle(cycle).await?;
        }
        if let Some(date) = &form.start_date {
            self.enter_start_date(date).await?;
        }
        if let Some(licenses) = form.licenses {
            self.enter_licenses(licenses).await?;
        }
        Ok(())
    }

    pub async fn click_save(&self) -> Result<()> {
        self.ctx.click(&Self::save_button()).await
    }

    pub async fn click_cancel(&self) -> Result<()> {
        self.ctx.click(&Self::cancel_button()).await
    }

    /// 在搜索框输入关键字并回车
    pub async fn search(&self, keyword: &str) -> Result<()> {
        let input = Self::search_input();
        self.ctx.fill(&input, keyword).await?;
        self.ctx.press(&input, "Enter").await?;
        info!("🔍 搜索订阅: {}", keyword);
        Ok(())
    }

    pub async fn clear_search(&self) -> Result<()> {
        if self.ctx.is_visible(&Self::clear_search_button()).await {
            return self.ctx.click(&Self::clear_search_button()).await;
        }
        let input = Self::search_input();
        self.ctx.fill(&input, "").await?;
        self.ctx.press(&input, "Enter").await
    }

    pub async fn sort_by_column(&self, header: &str) -> Result<()> {
        self.table.sort_by(&self.ctx, header).await
    }

    pub async fn click_edit(&self, row_index: usize) -> Result<()> {
        self.table.click_row_action(&self.ctx, row_index, "Edit").await?;
        modal::wait_open(&self.ctx).await.context("编辑订阅弹窗没有打开")
    }

    pub async fn click_delete(&self, row_index: usize) -> Result<()> {
        self.table.click_row_action(&self.ctx, row_index, "Delete").await
    }

    pub async fn confirm_delete(&self) -> Result<()> {
        self.ctx.click(&Self::confirm_delete_button()).await
    }

    pub async fn next_page(&self) -> Result<()> {
        self.table.next_page(&self.ctx).await
    }

    pub async fn previous_page(&self) -> Result<()> {
        self.table.previous_page(&self.ctx).await
    }

    // ========== 查询 ==========

    pub async fn is_loaded(&self) -> bool {
        self.ctx.is_visible(&Self::heading()).await
    }

    pub async fn is_modal_open(&self) -> bool {
        modal::is_open(&self.ctx).await
    }

    pub async fn get_form_errors(&self) -> Vec<String> {
        self.ctx
            .texts(&Locator::new("subscription form errors").css(FORM_ERROR_CSS))
            .await
    }

    /// 等待表格加载后读取当前页的行
    pub async fn get_rows(&self) -> Vec<TableRow> {
        self.table.wait_for_rows(&self.ctx).await
    }

    pub async fn get_column_values(&self, header: &str) -> Vec<String> {
        self.table.column_values(&self.ctx, header).await
    }

    pub async fn get_toast(&self) -> Option<Toast> {
        toast::wait_for_toast(&self.ctx).await
    }

    pub async fn get_pagination_text(&self) -> String {
        self.table.pagination_text(&self.ctx).await
    }
}
