//! 忘记密码 / 重置密码流程

use anyhow::{ensure, Result};
use tracing::info;

use crate::models::{ResetPasswordForm, Toast};
use crate::pages::components::toast;
use crate::pages::forgot_password::FORGOT_PASSWORD_ROUTE;
use crate::pages::{ForgotPasswordPage, LoginPage, PageContext, ResetPasswordPage};

/// 请求验证码后观察到的页面状态
#[derive(Debug, Clone, Default)]
pub struct OtpRequestOutcome {
    /// 邮箱校验提示（没有时为 `None`）
    pub email_error: Option<String>,
    pub otp_screen_visible: bool,
    pub toast: Option<Toast>,
}

impl OtpRequestOutcome {
    pub fn accepted(&self) -> bool {
        self.email_error.is_none() && self.otp_screen_visible
    }
}

/// 提交重置表单后观察到的页面状态
#[derive(Debug, Clone, Default)]
pub struct ResetOutcome {
    pub confirm_error_visible: bool,
    pub toast: Option<Toast>,
    pub still_on_reset_page: bool,
}

impl ResetOutcome {
    /// 出现确认密码错误、错误提示，或者停留在重置页，都算被拒绝
    pub fn rejected(&self) -> bool {
        self.confirm_error_visible
            || self.toast.as_ref().is_some_and(Toast::is_error)
            || self.still_on_reset_page
    }
}

/// 从登录页点击"忘记密码"进入忘记密码页
pub async fn open_forgot_password_from_login(ctx: &PageContext) -> Result<ForgotPasswordPage> {
    let login = LoginPage::new(ctx.clone());
    login.open().await?;
    login.click_forgot_password().await?;

    let timeout = ctx.config().element_wait().timeout;
    let page = ForgotPasswordPage::new(ctx.clone());
    let arrived = ctx
        .wait_for_url(timeout, |url| url.contains(FORGOT_PASSWORD_ROUTE))
        .await
        || page.is_loaded().await;
    ensure!(arrived, "点击忘记密码后没有进入忘记密码页");
    info!("🔑 已进入忘记密码页");
    Ok(page)
}

/// 输入邮箱并请求验证码
pub async fn request_otp(page: &ForgotPasswordPage, email: &str) -> Result<OtpRequestOutcome> {
    page.enter_email(email).await?;
    page.click_request_otp().await?;

    let email_error = if page.is_email_error_visible().await {
        Some(page.get_email_error_text().await)
    } else {
        None
    };
    // 邮箱被拒绝时不再等待验证码区域
    let otp_screen_visible = email_error.is_none() && page.is_otp_screen_visible().await;
    let timeout = page.ctx().config().query_wait().timeout;
    let toast = toast::wait_for_toast_within(page.ctx(), timeout).await;

    let outcome = OtpRequestOutcome {
        email_error,
        otp_screen_visible,
        toast,
    };
    info!(
        "📨 请求验证码 ({}): 邮箱错误={:?} 验证码区域={}",
        email, outcome.email_error, outcome.otp_screen_visible
    );
    Ok(outcome)
}

/// 填写并提交重置密码表单
pub async fn submit_reset(page: &ResetPasswordPage, form: &ResetPasswordForm) -> Result<ResetOutcome> {
    page.fill_reset_form(form).await?;
    page.click_submit().await?;

    let toast = toast::wait_for_toast(page.ctx()).await;
    let outcome = ResetOutcome {
        confirm_error_visible: page.is_confirm_password_error_visible().await,
        toast,
        still_on_reset_page: page.is_loaded().await,
    };
    info!("🔁 重置密码结果: 被拒绝={}", outcome.rejected());
    Ok(outcome)
}
