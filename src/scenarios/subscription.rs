//! 订阅管理场景（管理端）

use anyhow::{ensure, Context, Result};
use futures::future::BoxFuture;

use crate::config::Portal;
use crate::models::{SortDirection, SubscriptionForm};
use crate::pages::SubscriptionPage;
use crate::scenarios::{ScenarioCtx, ScenarioDef};
use crate::pages::components::modal;
use crate::workflow::{
    create_subscription, delete_subscription, edit_subscription, get_pagination_range, login_as,
    search_and_verify, verify_column_sort, PaginationRange,
};

const SUITE: &str = "Admin Portal - Subscription Module";

const AMOUNT_COLUMN: &str = "Amount";
const NEW_CUSTOMER: &str = "Acme Corp";
const NEW_PLAN: &str = "Enterprise";
const NEW_BILLING_CYCLE: &str = "Monthly";
const EDITED_LICENSES: u32 = 10;

pub fn scenarios() -> Vec<ScenarioDef> {
    vec![
        ScenarioDef {
            name: "should show a consistent pagination range",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: pagination_range,
        },
        ScenarioDef {
            name: "should filter the list by keyword",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: keyword_search,
        },
        ScenarioDef {
            name: "should sort by amount in descending order",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: sort_amount_descending,
        },
        ScenarioDef {
            name: "should create a new subscription",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: create,
        },
        ScenarioDef {
            name: "should move to the next page",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: next_page,
        },
        ScenarioDef {
            name: "should edit the licenses of a subscription",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: edit_licenses,
        },
        ScenarioDef {
            name: "should keep the subscription when delete is cancelled",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: cancel_delete,
        },
    ]
}

/// 登录并打开订阅列表
async fn open_list(ctx: &mut ScenarioCtx) -> Result<SubscriptionPage> {
    let portal = ctx.page().portal();
    let logged_in = login_as(ctx.page(), portal).await?;
    ctx.set_page(logged_in);
    let page = SubscriptionPage::new(ctx.page().clone());
    page.open().await?;
    Ok(page)
}

fn pagination_range(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_list(ctx).await?;
        let rows = page.get_rows().await;
        let range = get_pagination_range(page.ctx(), page.table())
            .await
            .context("没有读到分页信息")?;

        ensure!(range.start >= 1, "起始序号应从 1 开始: {}", range.text);
        ensure!(range.end >= range.start, "结束序号小于起始序号: {}", range.text);
        ensure!(range.total >= range.end, "总数小于结束序号: {}", range.text);
        ensure!(
            range.page_size() == rows.len() as u64,
            "分页显示 {} 条，表格实际 {} 行",
            range.page_size(),
            rows.len()
        );
        ctx.note(format!("分页: {}", range.text));
        Ok(())
    })
}

fn keyword_search(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_list(ctx).await?;
        // 用第一行的第一个单元格作为关键字，保证有结果
        let keyword = page
            .get_rows()
            .await
            .first()
            .and_then(|row| row.cell(0).map(str::to_string))
            .filter(|k| !k.is_empty())
            .context("列表为空，无法选取搜索关键字")?;

        let verification = search_and_verify(&page, &keyword).await?;
        ensure!(
            verification.all_match,
            "搜索 '{}' 后只有 {}/{} 行包含关键字",
            keyword,
            verification.matched,
            verification.total
        );
        page.clear_search().await?;
        ctx.note(format!("关键字 '{}' 命中 {} 行", keyword, verification.total));
        Ok(())
    })
}

fn sort_amount_descending(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_list(ctx).await?;
        page.get_rows().await;
        let verification =
            verify_column_sort(page.ctx(), page.table(), AMOUNT_COLUMN, SortDirection::Descending)
                .await?;

        ensure!(!verification.values.is_empty(), "'{}' 列没有可比较的数值", AMOUNT_COLUMN);
        ensure!(
            verification.is_sorted,
            "'{}' 列没有按降序排列: {}",
            AMOUNT_COLUMN,
            verification.errors.join("; ")
        );
        ctx.note(format!("校验了 {} 个金额", verification.values.len()));
        Ok(())
    })
}

fn create(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_list(ctx).await?;
        let start_date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let form = SubscriptionForm::new(NEW_CUSTOMER, NEW_PLAN)
            .billing_cycle(NEW_BILLING_CYCLE)
            .start_date(start_date)
            .licenses(5);

        let outcome = create_subscription(&page, &form).await?;
        if let Some(t) = &outcome.toast {
            ctx.note(format!("提示: {}", t.text));
        }
        ensure!(outcome.form_errors.is_empty(), "表单校验失败: {:?}", outcome.form_errors);
        ensure!(
            !outcome.toast.as_ref().is_some_and(|t| t.is_error()),
            "保存订阅出现错误提示"
        );
        ensure!(outcome.row_found, "列表中找不到新建的 '{}' 订阅", NEW_CUSTOMER);
        Ok(())
    })
}

/// 等待分页信息的起始序号离开 `from`
async fn wait_for_page_change(page: &SubscriptionPage, from: &PaginationRange) -> Option<PaginationRange> {
    let wait = page.ctx().config().element_wait();
    crate::utils::wait::wait_until(&wait, || async {
        get_pagination_range(page.ctx(), page.table())
            .await
            .filter(|r| r.start != from.start)
    })
    .await
}

fn next_page(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_list(ctx).await?;
        page.get_rows().await;
        let before = get_pagination_range(page.ctx(), page.table())
            .await
            .context("翻页前没有读到分页信息")?;
        ensure!(!before.is_last_page(), "只有一页数据，无法翻页: {}", before.text);
        ensure!(
            page.table().has_next_page(page.ctx()).await,
            "下一页按钮不可用: {}",
            before.text
        );

        page.next_page().await?;
        let after = wait_for_page_change(&page, &before)
            .await
            .context("翻页后分页信息没有变化")?;

        ensure!(
            after.start == before.end + 1,
            "下一页应从 {} 开始，实际为 {}",
            before.end + 1,
            after.start
        );
        ensure!(after.total == before.total, "翻页后总数变化: {} → {}", before.total, after.total);

        page.previous_page().await?;
        let back = wait_for_page_change(&page, &after)
            .await
            .context("返回上一页后分页信息没有变化")?;
        ensure!(back.start == before.start, "返回上一页后应从 {} 开始，实际为 {}", before.start, back.start);
        ctx.note(format!("{} → {} → {}", before.text, after.text, back.text));
        Ok(())
    })
}

fn edit_licenses(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_list(ctx).await?;
        ensure!(!page.get_rows().await.is_empty(), "列表为空，没有可编辑的订阅");

        let form = SubscriptionForm::default().licenses(EDITED_LICENSES);
        let outcome = edit_subscription(&page, 0, &form).await?;
        if let Some(t) = &outcome.toast {
            ctx.note(format!("提示: {}", t.text));
        }
        ensure!(
            outcome.dialog_title.to_lowercase().contains("edit"),
            "弹窗标题不是编辑: '{}'",
            outcome.dialog_title
        );
        ensure!(outcome.form_errors.is_empty(), "表单校验失败: {:?}", outcome.form_errors);
        ensure!(
            !outcome.toast.as_ref().is_some_and(|t| t.is_error()),
            "保存订阅出现错误提示"
        );
        ensure!(outcome.row_found, "编辑后列表中找不到该订阅");
        Ok(())
    })
}

fn cancel_delete(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_list(ctx).await?;
        ensure!(!page.get_rows().await.is_empty(), "列表为空，没有可删除的订阅");

        let outcome = delete_subscription(&page, 0, false).await?;
        ensure!(!modal::is_open(page.ctx()).await, "取消后确认弹窗仍然打开");
        ensure!(outcome.still_listed, "取消删除后 '{}' 不在列表中", outcome.key);
        ctx.note(format!("保留了 '{}'", outcome.key));
        Ok(())
    })
}
