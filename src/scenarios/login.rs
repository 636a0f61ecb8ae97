//! 登录场景

use anyhow::{ensure, Result};
use futures::future::BoxFuture;

use crate::config::Portal;
use crate::models::LoginForm;
use crate::pages::LoginPage;
use crate::scenarios::{ScenarioCtx, ScenarioDef};

const ADMIN_SUITE: &str = "Admin Portal - Login Module";
const PARTNER_SUITE: &str = "Partner Portal - Login Module";

pub fn scenarios() -> Vec<ScenarioDef> {
    vec![
        ScenarioDef {
            name: "should login with valid credentials",
            suite: ADMIN_SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: valid_login,
        },
        ScenarioDef {
            name: "should reject an invalid password",
            suite: ADMIN_SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: invalid_password,
        },
        ScenarioDef {
            name: "should show validation errors for empty credentials",
            suite: ADMIN_SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: empty_credentials,
        },
        ScenarioDef {
            name: "should login with valid credentials",
            suite: PARTNER_SUITE,
            file: file!(),
            portal: Portal::Partner,
            run: valid_login,
        },
    ]
}

/// 两个门户共用：用当前门户配置的账号登录
fn valid_login(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = LoginPage::new(ctx.page().clone());
        page.open().await?;
        page.login(&LoginForm::from_portal(ctx.page().portal_config()))
            .await?;

        ensure!(
            page.is_logged_in().await,
            "登录后没有离开登录页: {}",
            page.get_error_message().await
        );
        let url = ctx.page().current_url().await;
        ctx.note(format!("登录后地址: {}", url));
        Ok(())
    })
}

fn invalid_password(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = LoginPage::new(ctx.page().clone());
        page.open().await?;
        let email = ctx.page().portal_config().email.clone();
        page.login(&LoginForm::new(email, "Wrong#Password1")).await?;

        ensure!(!page.is_logged_in().await, "错误密码竟然登录成功");
        let message = page.get_error_message().await;
        ensure!(!message.is_empty(), "错误密码没有给出任何提示");
        ctx.note(format!("错误提示: {}", message));
        Ok(())
    })
}

fn empty_credentials(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = LoginPage::new(ctx.page().clone());
        page.open().await?;

        // 有的表单在字段为空时直接禁用登录按钮
        if !page.is_login_button_enabled().await {
            ctx.note("空表单时登录按钮已禁用");
            return Ok(());
        }
        page.login(&LoginForm::default()).await?;

        let email_error = page.is_email_error_visible().await;
        let password_error = page.is_password_error_visible().await;
        ensure!(
            email_error || password_error,
            "空账号密码提交后没有出现校验提示"
        );
        ensure!(!page.is_logged_in().await, "空账号密码竟然登录成功");
        ctx.note(format!("邮箱提示={} 密码提示={}", email_error, password_error));
        Ok(())
    })
}
