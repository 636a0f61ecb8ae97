//! 仪表盘场景（管理端）

use anyhow::{ensure, Result};
use futures::future::BoxFuture;

use crate::config::Portal;
use crate::pages::DashboardPage;
use crate::scenarios::{ScenarioCtx, ScenarioDef};
use crate::workflow::login_as;

const SUITE: &str = "Admin Portal - Dashboard Module";

const DATE_RANGE: &str = "Last 30 Days";

pub fn scenarios() -> Vec<ScenarioDef> {
    vec![
        ScenarioDef {
            name: "should display stat cards with values",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: stat_cards,
        },
        ScenarioDef {
            name: "should render every graph",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: graphs_rendered,
        },
        ScenarioDef {
            name: "should apply the date range filter",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: date_range_filter,
        },
        ScenarioDef {
            name: "should clear applied filters",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: clear_filters,
        },
    ]
}

async fn open_dashboard(ctx: &mut ScenarioCtx) -> Result<DashboardPage> {
    let portal = ctx.page().portal();
    let logged_in = login_as(ctx.page(), portal).await?;
    ctx.set_page(logged_in);
    let page = DashboardPage::new(ctx.page().clone());
    page.open().await?;
    Ok(page)
}

fn stat_cards(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_dashboard(ctx).await?;
        let titles = page.get_stat_card_titles().await;
        ensure!(!titles.is_empty(), "仪表盘上没有统计卡片");

        let mut empty = Vec::new();
        for title in &titles {
            let value = page.get_stat_card_value(title).await;
            if value.is_empty() {
                empty.push(title.clone());
            }
            ctx.note(format!("{} = {}", title, value));
        }
        ensure!(empty.is_empty(), "以下统计卡片没有数值: {:?}", empty);
        Ok(())
    })
}

fn graphs_rendered(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_dashboard(ctx).await?;
        let titles = page.get_graph_titles().await;
        ensure!(!titles.is_empty(), "仪表盘上没有图表");

        let mut blank = Vec::new();
        for title in &titles {
            if !page.is_graph_rendered(title).await {
                blank.push(title.clone());
            }
        }
        ctx.screenshot("graphs").await;
        ensure!(blank.is_empty(), "以下图表没有渲染内容: {:?}", blank);
        ctx.note(format!("已渲染图表: {:?}", titles));
        Ok(())
    })
}

fn date_range_filter(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_dashboard(ctx).await?;
        page.select_date_range(DATE_RANGE).await?;
        if page.is_apply_button_visible().await {
            page.apply_filters().await?;
        }

        ensure!(
            page.is_filter_applied(DATE_RANGE).await,
            "日期范围 '{}' 没有处于选中状态",
            DATE_RANGE
        );
        ensure!(page.is_loaded().await, "应用筛选后仪表盘没有重新加载");
        Ok(())
    })
}

fn clear_filters(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_dashboard(ctx).await?;
        page.select_date_range(DATE_RANGE).await?;
        if page.is_apply_button_visible().await {
            page.apply_filters().await?;
        }
        ensure!(
            page.is_filter_applied(DATE_RANGE).await,
            "清除前日期范围 '{}' 没有处于选中状态",
            DATE_RANGE
        );

        page.clear_filters().await?;
        ensure!(
            !page.is_filter_applied(DATE_RANGE).await,
            "清除后日期范围 '{}' 仍处于选中状态",
            DATE_RANGE
        );
        ensure!(page.is_loaded().await, "清除筛选后仪表盘没有重新加载");
        Ok(())
    })
}
