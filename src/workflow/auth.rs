//! 登录流程

use anyhow::{bail, Result};
use tracing::info;

use crate::config::Portal;
use crate::models::LoginForm;
use crate::pages::{LoginPage, PageContext};

/// 用配置中的账号登录指定门户，返回切换到该门户后的上下文
pub async fn login_as(ctx: &PageContext, portal: Portal) -> Result<PageContext> {
    let ctx = ctx.for_portal(portal);
    let page = LoginPage::new(ctx.clone());
    page.open().await?;
    page.login(&LoginForm::from_portal(ctx.portal_config())).await?;

    if !page.is_logged_in().await {
        let message = page.get_error_message().await;
        bail!(
            "{} 登录失败: {}",
            portal.label(),
            if message.is_empty() { "页面未跳转" } else { &message }
        );
    }
    info!("✅ 已登录 {}", portal.label());
    Ok(ctx)
}
