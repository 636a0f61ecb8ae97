//! 订阅相关流程

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::models::{SubscriptionForm, Toast};
use crate::pages::components::modal;
use crate::pages::SubscriptionPage;
use crate::workflow::filtering::{verify_keyword_filter, FilterVerification};

#[derive(Debug, Clone, Default)]
pub struct SubscriptionOutcome {
    /// 弹窗标题，例如 "Edit Subscription"
    pub dialog_title: String,
    pub toast: Option<Toast>,
    /// 保存后按客户搜索能找到对应行
    pub row_found: bool,
    /// 弹窗没有关闭时表单上的校验提示
    pub form_errors: Vec<String>,
}

impl SubscriptionOutcome {
    pub fn succeeded(&self) -> bool {
        self.form_errors.is_empty()
            && !self.toast.as_ref().is_some_and(Toast::is_error)
            && self.row_found
    }
}

/// 打开新增弹窗 → 填写 → 保存 → 读取提示 → 按客户搜索确认新行
pub async fn create_subscription(page: &SubscriptionPage, form: &SubscriptionForm) -> Result<SubscriptionOutcome> {
    page.click_add_subscription().await?;
    let outcome = save_form(page, form).await?;
    info!(
        "🆕 新增订阅: 提示={:?} 找到行={}",
        outcome.toast.as_ref().map(|t| &t.text),
        outcome.row_found
    );
    Ok(outcome)
}

/// 打开某一行的编辑弹窗 → 修改给出的字段 → 保存
///
/// 表单没有给出客户时，以被编辑行的第一列作为搜索关键字。
pub async fn edit_subscription(
    page: &SubscriptionPage,
    row_index: usize,
    form: &SubscriptionForm,
) -> Result<SubscriptionOutcome> {
    let key = page
        .get_rows()
        .await
        .get(row_index)
        .and_then(|row| row.cell(0).map(str::to_string))
        .with_context(|| format!("第 {} 行不存在", row_index + 1))?;
    page.click_edit(row_index).await?;
    let dialog_title = modal::title(page.ctx()).await;

    let keyword = form.customer.clone().unwrap_or(key);
    page.fill_form(form).await?;
    let outcome = SubscriptionOutcome {
        dialog_title,
        ..save_form_searching(page, Some(keyword.as_str())).await?
    };
    info!(
        "✏️ 编辑订阅 (第 {} 行): 弹窗='{}' 提示={:?}",
        row_index + 1,
        outcome.dialog_title,
        outcome.toast.as_ref().map(|t| &t.text)
    );
    Ok(outcome)
}

async fn save_form(page: &SubscriptionPage, form: &SubscriptionForm) -> Result<SubscriptionOutcome> {
    let dialog_title = modal::title(page.ctx()).await;
    page.fill_form(form).await?;
    Ok(SubscriptionOutcome {
        dialog_title,
        ..save_form_searching(page, form.customer.as_deref()).await?
    })
}

/// 保存 → 读取提示 → 弹窗关闭后按关键字搜索确认行存在
async fn save_form_searching(page: &SubscriptionPage, keyword: Option<&str>) -> Result<SubscriptionOutcome> {
    page.click_save().await?;

    let toast = page.get_toast().await;
    let timeout = page.ctx().config().element_wait().timeout;
    if modal::wait_closed(page.ctx(), timeout).await.is_err() {
        let form_errors = page.get_form_errors().await;
        warn!("⚠️ 保存后弹窗仍然打开: {:?}", form_errors);
        return Ok(SubscriptionOutcome {
            toast,
            form_errors,
            ..Default::default()
        });
    }

    let row_found = match keyword {
        Some(keyword) => {
            page.search(keyword).await?;
            page.get_rows().await.iter().any(|row| row.contains(keyword))
        }
        None => false,
    };
    Ok(SubscriptionOutcome {
        toast,
        row_found,
        ..Default::default()
    })
}

#[derive(Debug, Clone, Default)]
pub struct DeleteOutcome {
    /// 被删除行的第一列
    pub key: String,
    pub toast: Option<Toast>,
    /// 操作结束后当前页仍有该行
    pub still_listed: bool,
}

/// 点击某一行的删除，按 `confirm` 确认或取消
pub async fn delete_subscription(page: &SubscriptionPage, row_index: usize, confirm: bool) -> Result<DeleteOutcome> {
    let key = page
        .get_rows()
        .await
        .get(row_index)
        .and_then(|row| row.cell(0).map(str::to_string))
        .with_context(|| format!("第 {} 行不存在", row_index + 1))?;

    page.click_delete(row_index).await?;
    let toast = if confirm {
        page.confirm_delete().await?;
        page.get_toast().await
    } else {
        page.click_cancel().await?;
        None
    };

    let still_listed = page
        .table()
        .rows(page.ctx())
        .await
        .iter()
        .any(|row| row.cell(0) == Some(key.as_str()));
    info!(
        "🗑️ 删除订阅 '{}': 确认={} 仍在列表={}",
        key, confirm, still_listed
    );
    Ok(DeleteOutcome {
        key,
        toast,
        still_listed,
    })
}

/// 搜索关键字并校验结果的每一行都包含它
pub async fn search_and_verify(page: &SubscriptionPage, keyword: &str) -> Result<FilterVerification> {
    page.search(keyword).await?;
    let rows = page.get_rows().await;
    if rows.is_empty() && page.table().is_empty(page.ctx()).await {
        info!("🔍 搜索 '{}' 显示空列表提示", keyword);
    }
    let verification = verify_keyword_filter(&rows, keyword);
    info!(
        "🔍 搜索 '{}': {}/{} 行匹配",
        keyword, verification.matched, verification.total
    );
    Ok(verification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake::{ClickEffect, FakeDom, FakeElement};
    use crate::locator::Strategy;
    use crate::pages::testing::context;
    use std::sync::Arc;

    fn row_action(action: &str) -> Strategy {
        Strategy::css(format!(
            "table tbody tr:nth-child(1) button[aria-label*='{action}' i]"
        ))
    }

    fn listed_dom() -> Arc<FakeDom> {
        let dom = Arc::new(FakeDom::new());
        dom.add(Strategy::css("input[type='search']"), FakeElement::visible(""));
        dom.add(
            Strategy::css("table tbody tr"),
            FakeElement::row(&["Acme Corp", "Enterprise", "5"]),
        );
        dom
    }

    #[tokio::test]
    async fn search_verifies_every_row() {
        let dom = Arc::new(FakeDom::new());
        dom.add(Strategy::css("input[type='search']"), FakeElement::visible(""));
        dom.add(Strategy::css("table tbody tr"), FakeElement::row(&["Acme Corp", "Enterprise"]));
        dom.add(Strategy::css("table tbody tr"), FakeElement::row(&["Acme Labs", "Starter"]));
        let page = SubscriptionPage::new(context(dom));

        let result = search_and_verify(&page, "acme").await.unwrap();

        assert!(result.all_match);
        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn search_with_no_results_does_not_verify() {
        let dom = Arc::new(FakeDom::new());
        dom.add(Strategy::css("input[type='search']"), FakeElement::visible(""));
        let page = SubscriptionPage::new(context(dom));

        let result = search_and_verify(&page, "nothing-here").await.unwrap();

        assert_eq!(result.total, 0);
        assert!(!result.all_match);
    }

    #[tokio::test]
    async fn edit_changes_licenses_and_finds_row_again() {
        let dom = listed_dom();
        let dialog = Strategy::css("mat-dialog-container");
        dom.add(row_action("Edit"), FakeElement::visible(""));
        dom.on_click(row_action("Edit"), ClickEffect::Show(dialog.clone(), FakeElement::visible("")));
        dom.on_click(
            row_action("Edit"),
            ClickEffect::Show(
                Strategy::css("mat-dialog-container h2"),
                FakeElement::visible("Edit Subscription"),
            ),
        );
        dom.add(Strategy::css("input[formcontrolname='licenses']"), FakeElement::visible(""));
        let save = Strategy::css("mat-dialog-container button[type='submit']");
        dom.add(save.clone(), FakeElement::visible("Save"));
        dom.on_click(save, ClickEffect::Remove(dialog));
        let page = SubscriptionPage::new(context(dom.clone()));

        let outcome = edit_subscription(&page, 0, &SubscriptionForm::default().licenses(10))
            .await
            .unwrap();

        assert_eq!(outcome.dialog_title, "Edit Subscription");
        assert!(outcome.succeeded());
        assert_eq!(
            dom.fills(),
            vec![
                ("licenses input".to_string(), "10".to_string()),
                ("subscription search input".to_string(), "Acme Corp".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn edit_of_missing_row_fails_before_clicking() {
        let dom = listed_dom();
        let page = SubscriptionPage::new(context(dom.clone()));

        let err = edit_subscription(&page, 3, &SubscriptionForm::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("第 4 行不存在"));
        assert!(dom.clicks().is_empty());
    }

    #[tokio::test]
    async fn cancelled_delete_keeps_row() {
        let dom = listed_dom();
        let dialog = Strategy::css("mat-dialog-container");
        dom.add(row_action("Delete"), FakeElement::visible(""));
        dom.on_click(row_action("Delete"), ClickEffect::Show(dialog.clone(), FakeElement::visible("")));
        dom.add(Strategy::css("button[mat-dialog-close]"), FakeElement::visible("Cancel"));
        dom.on_click(Strategy::css("button[mat-dialog-close]"), ClickEffect::Remove(dialog));
        let page = SubscriptionPage::new(context(dom.clone()));

        let outcome = delete_subscription(&page, 0, false).await.unwrap();

        assert_eq!(outcome.key, "Acme Corp");
        assert!(outcome.still_listed);
        assert!(outcome.toast.is_none());
        assert!(!page.is_modal_open().await);
    }

    #[tokio::test]
    async fn confirmed_delete_drops_row() {
        let dom = listed_dom();
        dom.add(row_action("Delete"), FakeElement::visible(""));
        dom.on_click(
            row_action("Delete"),
            ClickEffect::Show(Strategy::css(".swal2-confirm"), FakeElement::visible("Delete")),
        );
        dom.on_click(
            Strategy::css(".swal2-confirm"),
            ClickEffect::Remove(Strategy::css("table tbody tr")),
        );
        let page = SubscriptionPage::new(context(dom));

        let outcome = delete_subscription(&page, 0, true).await.unwrap();

        assert!(!outcome.still_listed);
    }

    #[test]
    fn outcome_requires_row_and_no_errors() {
        assert!(!SubscriptionOutcome::default().succeeded());
        assert!(SubscriptionOutcome {
            row_found: true,
            ..Default::default()
        }
        .succeeded());
        assert!(!SubscriptionOutcome {
            row_found: true,
            form_errors: vec!["Plan is required".to_string()],
            ..Default::default()
        }
        .succeeded());
    }
}
