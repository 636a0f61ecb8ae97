//! 忘记密码场景

use anyhow::{ensure, Result};
use futures::future::BoxFuture;

use crate::config::Portal;
use crate::models::ResetPasswordForm;
use crate::pages::components::toast;
use crate::pages::reset_password::RESET_PASSWORD_ROUTE;
use crate::pages::ResetPasswordPage;
use crate::scenarios::{ScenarioCtx, ScenarioDef};
use crate::workflow::{open_forgot_password_from_login, request_otp, submit_reset};

const SUITE: &str = "Admin Portal - Forgot Password Module";

const MALFORMED_EMAIL: &str = "not-an-email";
const WRONG_OTP: &str = "000000";
const NEW_PASSWORD: &str = "NewPass@123";
const MISMATCHED_PASSWORD: &str = "DifferentPass@123";

pub fn scenarios() -> Vec<ScenarioDef> {
    vec![
        ScenarioDef {
            name: "should show an error for an empty email",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: empty_email,
        },
        ScenarioDef {
            name: "should show an error for an invalid email format",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: invalid_email_format,
        },
        ScenarioDef {
            name: "should show the OTP screen for a registered email",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: otp_screen_for_valid_email,
        },
        ScenarioDef {
            name: "should reject an invalid OTP",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: invalid_otp,
        },
        ScenarioDef {
            name: "should reject mismatched passwords on reset",
            suite: SUITE,
            file: file!(),
            portal: Portal::Admin,
            run: password_mismatch,
        },
    ]
}

fn empty_email(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_forgot_password_from_login(ctx.page()).await?;
        let outcome = request_otp(&page, "").await?;

        ensure!(page.is_email_error_visible().await, "空邮箱没有出现校验提示");
        ensure!(!outcome.otp_screen_visible, "空邮箱竟然进入了验证码页面");
        ctx.note(format!("提示: {}", outcome.email_error.unwrap_or_default()));
        Ok(())
    })
}

fn invalid_email_format(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_forgot_password_from_login(ctx.page()).await?;
        let outcome = request_otp(&page, MALFORMED_EMAIL).await?;

        let rejected_by_toast = outcome.toast.as_ref().is_some_and(|t| t.is_error());
        ensure!(
            outcome.email_error.is_some() || rejected_by_toast,
            "格式错误的邮箱 '{}' 没有被拒绝",
            MALFORMED_EMAIL
        );
        ensure!(!outcome.accepted(), "格式错误的邮箱竟然进入了验证码页面");
        Ok(())
    })
}

fn otp_screen_for_valid_email(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_forgot_password_from_login(ctx.page()).await?;
        let email = ctx.page().portal_config().email.clone();
        let outcome = request_otp(&page, &email).await?;

        ensure!(
            outcome.accepted(),
            "注册邮箱没有进入验证码页面: {:?}",
            outcome.email_error
        );
        ctx.note(format!(
            "重发验证码可用: {}",
            page.is_resend_otp_enabled().await
        ));
        Ok(())
    })
}

fn invalid_otp(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = open_forgot_password_from_login(ctx.page()).await?;
        let email = ctx.page().portal_config().email.clone();
        let outcome = request_otp(&page, &email).await?;
        ensure!(outcome.accepted(), "没有进入验证码页面，无法校验验证码");

        page.enter_otp(WRONG_OTP).await?;
        page.click_verify_otp().await?;

        let otp_error = page.is_otp_error_visible().await;
        let error_toast = toast::wait_for_toast(ctx.page())
            .await
            .filter(|t| t.is_error());
        ensure!(
            otp_error || error_toast.is_some(),
            "错误验证码没有被拒绝"
        );
        if let Some(t) = error_toast {
            ctx.note(format!("提示: {}", t.text));
        }
        Ok(())
    })
}

fn password_mismatch(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.page().navigate(RESET_PASSWORD_ROUTE).await?;
        let page = ResetPasswordPage::new(ctx.page().clone());
        let form = ResetPasswordForm::new(NEW_PASSWORD, MISMATCHED_PASSWORD);
        ensure!(!form.passwords_match(), "测试数据中的两次密码必须不同");
        let outcome = submit_reset(&page, &form).await?;

        ensure!(
            outcome.rejected(),
            "两次密码不一致却没有被拒绝: {:?}",
            outcome
        );
        let messages = page.get_validation_messages().await;
        ctx.note(format!(
            "确认密码提示={} 停留在重置页={} 校验提示={:?}",
            outcome.confirm_error_visible, outcome.still_on_reset_page, messages
        ));
        Ok(())
    })
}
