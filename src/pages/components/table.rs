//! 数据表格组件：行、表头、排序与分页

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::locator::{Fallback, Locator, Strategy};
use crate::models::{SortDirection, TableRow};
use crate::pages::PageContext;
use crate::utils::wait::wait_until;

const CELL_CSS: &str = "td, [role='cell'], mat-cell";

#[derive(Debug, Clone)]
pub struct DataTable {
    /// 表格所在区域的 CSS 前缀，为空时匹配整个页面
    scope: String,
}

impl Default for DataTable {
    fn default() -> Self {
        Self::new("")
    }
}

impl DataTable {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    fn scoped(&self, css: &str) -> String {
        if self.scope.is_empty() {
            css.to_string()
        } else {
            format!("{} {}", self.scope, css)
        }
    }

    pub fn row_locator(&self) -> Locator {
        Locator::new("table rows")
            .css(self.scoped("table tbody tr"))
            .css(self.scoped("mat-row"))
            .css(self.scoped("[role='rowgroup'] [role='row']"))
    }

    pub fn header_locator(&self) -> Locator {
        Locator::new("table headers")
            .css(self.scoped("table thead th"))
            .css(self.scoped("mat-header-cell"))
            .css(self.scoped("[role='columnheader']"))
    }

    fn header_cell(&self, header: &str) -> Locator {
        Locator::new(format!("column header '{}'", header))
            .with(Strategy::exact_text_in(self.scoped("th"), header))
            .with(Strategy::exact_text_in(self.scoped("[role='columnheader']"), header))
            .with(Strategy::text_in(self.scoped("th"), header))
            .with(Strategy::text_in(self.scoped("[role='columnheader']"), header))
    }

    pub fn pagination_label(&self) -> Locator {
        Locator::new("pagination label")
            .css(self.scoped(".mat-mdc-paginator-range-label"))
            .css(self.scoped(".mat-paginator-range-label"))
            .css(self.scoped(".dataTables_info"))
            .css(self.scoped(".pagination-info"))
            .css(self.scoped("[class*='showing']"))
            .text("records")
            .fallback(Fallback::DomAttached)
    }

    fn next_button(&self) -> Locator {
        Locator::new("next page button")
            .css(self.scoped("button.mat-mdc-paginator-navigation-next"))
            .css(self.scoped("button[aria-label='Next page']"))
            .css(self.scoped(".pagination .next a"))
            .css(self.scoped("li.page-item.next a"))
            .role_named("button", "Next")
    }

    fn previous_button(&self) -> Locator {
        Locator::new("previous page button")
            .css(self.scoped("button.mat-mdc-paginator-navigation-previous"))
            .css(self.scoped("button[aria-label='Previous page']"))
            .css(self.scoped(".pagination .previous a"))
            .css(self.scoped("li.page-item.prev a"))
            .role_named("button", "Previous")
    }

    fn row_action(&self, row_index: usize, action: &str) -> Locator {
        let nth = row_index + 1;
        Locator::new(format!("{} button on row {}", action, nth))
            .css(self.scoped(&format!(
                "table tbody tr:nth-child({nth}) button[aria-label*='{action}' i]"
            )))
            .css(self.scoped(&format!(
                "table tbody tr:nth-child({nth}) [title*='{action}' i]"
            )))
            .css(self.scoped(&format!(
                "table tbody tr:nth-child({nth}) [mattooltip*='{action}' i]"
            )))
            .css(self.scoped(&format!(
                "mat-row:nth-of-type({nth}) button[aria-label*='{action}' i]"
            )))
            .xpath(format!(
                "(//table//tbody/tr)[{nth}]//*[self::button or self::a][contains(normalize-space(.), '{action}')]"
            ))
            // 操作按钮通常只在悬停时显示
            .fallback(Fallback::ForceVisible)
    }

    pub fn empty_state(&self) -> Locator {
        Locator::new("empty table message")
            .css(self.scoped(".no-data"))
            .css(self.scoped(".empty-state"))
            .css(self.scoped("td.mat-mdc-no-data-row"))
            .text("No records found")
            .text("No data available")
    }

    // ========== 查询 ==========

    /// 当前页所有数据行（不含"暂无数据"占位行）
    pub async fn rows(&self, ctx: &PageContext) -> Vec<TableRow> {
        for strategy in &self.row_locator().candidates {
            match ctx.dom().table_rows(strategy, CELL_CSS).await {
                Ok(rows) if !rows.is_empty() => {
                    return rows
                        .into_iter()
                        .filter(|cells| !is_placeholder_row(cells))
                        .enumerate()
                        .map(|(index, cells)| TableRow::new(index, cells))
                        .collect();
                }
                Ok(_) => {}
                Err(e) => debug!("读取表格行失败 ({}): {:#}", strategy, e),
            }
        }
        Vec::new()
    }

    /// 等待表格出现至少一行数据
    pub async fn wait_for_rows(&self, ctx: &PageContext) -> Vec<TableRow> {
        let wait = ctx.config().element_wait();
        wait_until(&wait, || async {
            let rows = self.rows(ctx).await;
            (!rows.is_empty()).then_some(rows)
        })
        .await
        .unwrap_or_default()
    }

    pub async fn headers(&self, ctx: &PageContext) -> Vec<String> {
        ctx.texts(&self.header_locator()).await
    }

    /// 按表头文本找列下标：先精确匹配，再包含匹配
    pub async fn column_index(&self, ctx: &PageContext, header: &str) -> Option<usize> {
        find_column(&self.headers(ctx).await, header)
    }

    pub async fn column_values(&self, ctx: &PageContext, header: &str) -> Vec<String> {
        let Some(column) = self.column_index(ctx, header).await else {
            debug!("表格中没有列 '{}'", header);
            return Vec::new();
        };
        self.rows(ctx)
            .await
            .iter()
            .filter_map(|row| row.cell(column).map(str::to_string))
            .collect()
    }

    /// 表头上的排序状态（`aria-sort`）
    pub async fn sort_state(&self, ctx: &PageContext, header: &str) -> Option<SortDirection> {
        let aria = ctx.attribute_of(&self.header_cell(header), "aria-sort").await?;
        [SortDirection::Ascending, SortDirection::Descending]
            .into_iter()
            .find(|direction| direction.aria_value() == aria.trim())
    }

    pub async fn pagination_text(&self, ctx: &PageContext) -> String {
        ctx.text_of(&self.pagination_label()).await
    }

    pub async fn has_next_page(&self, ctx: &PageContext) -> bool {
        ctx.is_enabled(&self.next_button()).await
    }

    pub async fn is_empty(&self, ctx: &PageContext) -> bool {
        ctx.is_visible(&self.empty_state()).await
    }

    // ========== 操作 ==========

    /// 点击表头排序
    pub async fn sort_by(&self, ctx: &PageContext, header: &str) -> Result<()> {
        ctx.click(&self.header_cell(header))
            .await
            .with_context(|| format!("点击列 '{}' 排序失败", header))?;
        info!("↕️ 已按 '{}' 排序", header);
        Ok(())
    }

    pub async fn next_page(&self, ctx: &PageContext) -> Result<()> {
        ctx.click(&self.next_button()).await
    }

    pub async fn previous_page(&self, ctx: &PageContext) -> Result<()> {
        ctx.click(&self.previous_button()).await
    }

    /// 点击某一行的操作按钮（如 Edit / Delete）
    pub async fn click_row_action(&self, ctx: &PageContext, row_index: usize, action: &str) -> Result<()> {
        ctx.click(&self.row_action(row_index, action)).await
    }
}

fn find_column(headers: &[String], header: &str) -> Option<usize> {
    let want = header.trim().to_lowercase();
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    normalized
        .iter()
        .position(|h| *h == want)
        .or_else(|| normalized.iter().position(|h| h.contains(&want)))
}

fn is_placeholder_row(cells: &[String]) -> bool {
    if cells.is_empty() {
        return true;
    }
    cells.len() == 1 && {
        let text = cells[0].to_lowercase();
        text.contains("no record") || text.contains("no data") || text.contains("no results")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake::{FakeDom, FakeElement};
    use crate::pages::testing::context;
    use std::sync::Arc;

    fn seeded() -> Arc<FakeDom> {
        let dom = Arc::new(FakeDom::new());
        for header in ["Customer", "Plan", "Amount", "Status"] {
            dom.add(Strategy::css("table thead th"), FakeElement::visible(header));
        }
        dom.add(
            Strategy::css("table tbody tr"),
            FakeElement::row(&["Acme Corp", "Enterprise", "$1,200.00", "Active"]),
        );
        dom.add(
            Strategy::css("table tbody tr"),
            FakeElement::row(&["Globex", "Starter", "$300.00", "Expired"]),
        );
        dom
    }

    #[tokio::test]
    async fn reads_rows_and_column_values_by_header() {
        let dom = seeded();
        let ctx = context(dom);
        let table = DataTable::default();

        let rows = table.rows(&ctx).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].index, 1);
        assert_eq!(
            table.column_values(&ctx, "amount").await,
            vec!["$1,200.00", "$300.00"]
        );
        assert!(table.column_values(&ctx, "Renewal").await.is_empty());
    }

    #[tokio::test]
    async fn placeholder_row_is_not_data() {
        let dom = Arc::new(FakeDom::new());
        dom.add(
            Strategy::css("table tbody tr"),
            FakeElement::row(&["No records found"]),
        );
        let table = DataTable::default();
        assert!(table.rows(&context(dom)).await.is_empty());
    }

    #[tokio::test]
    async fn hover_only_row_action_is_revealed_then_clicked() {
        let dom = seeded();
        let edit = Strategy::css("table tbody tr:nth-child(2) button[aria-label*='Edit' i]");
        dom.add(edit.clone(), FakeElement::hidden(""));
        let table = DataTable::default();

        table
            .click_row_action(&context(dom.clone()), 1, "Edit")
            .await
            .unwrap();

        assert_eq!(dom.clicks(), vec!["Edit button on row 2"]);
        assert!(dom.element(&edit, 0).unwrap().visible);
    }

    #[tokio::test]
    async fn pagination_state_and_empty_message() {
        let dom = Arc::new(FakeDom::new());
        dom.add(
            Strategy::css("button[aria-label='Next page']"),
            FakeElement::visible("").disabled(),
        );
        dom.add(Strategy::css(".no-data"), FakeElement::visible("No records found"));
        let table = DataTable::default();
        let ctx = context(dom);

        assert!(!table.has_next_page(&ctx).await);
        assert!(table.is_empty(&ctx).await);
    }

    #[test]
    fn exact_header_match_beats_partial() {
        let headers = vec!["Start Date".to_string(), "Date".to_string()];
        assert_eq!(find_column(&headers, "date"), Some(1));
        assert_eq!(find_column(&headers, "start"), Some(0));
        assert_eq!(find_column(&headers, "plan"), None);
    }

    #[tokio::test]
    async fn sort_state_comes_from_aria_sort() {
        let dom = Arc::new(FakeDom::new());
        dom.add(
            Strategy::exact_text_in("th", "Amount"),
            FakeElement::visible("Amount").with_attr("aria-sort", "descending"),
        );
        let table = DataTable::default();
        let ctx = context(dom);

        assert_eq!(
            table.sort_state(&ctx, "Amount").await,
            Some(SortDirection::Descending)
        );
        assert_eq!(table.sort_state(&ctx, "Plan").await, None);
    }
}
