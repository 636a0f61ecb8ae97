//! 忘记密码页：输入邮箱 → 请求验证码 → 输入验证码

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::locator::{Locator, Resolved, Strategy};
use crate::pages::PageContext;

pub const FORGOT_PASSWORD_ROUTE: &str = "/forgot-password";

/// 逐位输入框（每格一个数字）
const SPLIT_OTP_CSS: &str = "ng-otp-input input, .otp-input input, input.otp-box";

pub struct ForgotPasswordPage {
    ctx: PageContext,
}

impl ForgotPasswordPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    pub fn ctx(&self) -> &PageContext {
        &self.ctx
    }

    fn heading() -> Locator {
        Locator::new("forgot password heading")
            .with(Strategy::text_in("h1, h2, h3, h4, mat-card-title", "Forgot Password"))
            .with(Strategy::text_in("h1, h2, h3, h4, mat-card-title", "Reset Password"))
            .css("app-forgot-password")
    }

    fn email_input() -> Locator {
        Locator::new("forgot password email input")
            .css("input[formcontrolname='email']")
            .css("input[type='email']")
            .placeholder("Email")
            .label("Email")
    }

    fn request_otp_button() -> Locator {
        Locator::new("request OTP button")
            .role_named("button", "Send OTP")
            .role_named("button", "Request OTP")
            .role_named("button", "Get OTP")
            .css("button[type='submit']")
    }

    fn email_error() -> Locator {
        Locator::new("forgot password email error")
            .css("mat-form-field:has(input[formcontrolname='email']) mat-error")
            .css("input[formcontrolname='email'] ~ .invalid-feedback")
            .css(".email-error")
            .css("mat-error")
            .text("Email is required")
            .text("valid email")
    }

    fn otp_input() -> Locator {
        Locator::new("OTP input")
            .css("input[formcontrolname='otp']")
            .css("input[autocomplete='one-time-code']")
            .css(SPLIT_OTP_CSS)
            .placeholder("OTP")
            .label("OTP")
    }

    fn verify_otp_button() -> Locator {
        Locator::new("verify OTP button")
            .role_named("button", "Verify")
            .role_named("button", "Submit OTP")
            .css("button[type='submit']")
    }

    fn otp_error() -> Locator {
        Locator::new("OTP error")
            .css("mat-form-field:has(input[formcontrolname='otp']) mat-error")
            .css(".otp-error")
            .text("Invalid OTP")
            .text("incorrect OTP")
            .text("OTP has expired")
    }

    fn resend_otp_link() -> Locator {
        Locator::new("resend OTP link")
            .role_named("button", "Resend")
            .role_named("link", "Resend")
            .with(Strategy::text_in("a, button, span", "Resend OTP"))
    }

    fn back_to_login_link() -> Locator {
        Locator::new("back to login link")
            .css("a[routerlink*='login']")
            .css("a[href*='login']")
            .with(Strategy::text_in("a, button", "Back to Login"))
            .role_named("link", "Login")
    }

    // ========== 操作 ==========

    pub async fn open(&self) -> Result<()> {
        self.ctx.navigate(FORGOT_PASSWORD_ROUTE).await?;
        self.ctx
            .locate(&Self::email_input())
            .await
            .context("忘记密码页没有加载")?;
        Ok(())
    }

    pub async fn enter_email(&self, email: &str) -> Result<()> {
        self.ctx.fill(&Self::email_input(), email).await
    }

    pub async fn click_request_otp(&self) -> Result<()> {
        self.ctx.click(&Self::request_otp_button()).await
    }

    /// 输入验证码；逐位输入框按格填写
    pub async fn enter_otp(&self, otp: &str) -> Result<()> {
        let split = Strategy::css(SPLIT_OTP_CSS);
        let boxes = match self.ctx.dom().probe(&split).await {
            Ok(probe) => probe.attached,
            Err(e) => {
                debug!("探测逐位验证码输入框失败: {:#}", e);
                0
            }
        };
        if boxes <= 1 {
            return self.ctx.fill(&Self::otp_input(), otp).await;
        }

        let digits: Vec<char> = otp.chars().collect();
        if digits.len() > boxes {
            bail!("验证码 '{}' 超过输入框数量 {}", otp, boxes);
        }
        for (index, digit) in digits.iter().enumerate() {
            let target = Resolved {
                element: format!("OTP digit {}", index + 1),
                strategy: split.clone(),
                index,
                visible: true,
            };
            self.ctx
                .dom()
                .fill(&target, &digit.to_string())
                .await
                .with_context(|| format!("填写第 {} 位验证码失败", index + 1))?;
        }
        self.ctx.wait_for_settle().await;
        info!("🔢 已输入 {} 位验证码", digits.len());
        Ok(())
    }

    pub async fn click_verify_otp(&self) -> Result<()> {
        self.ctx.click(&Self::verify_otp_button()).await
    }

    pub async fn click_resend_otp(&self) -> Result<()> {
        self.ctx.click(&Self::resend_otp_link()).await
    }

    pub async fn click_back_to_login(&self) -> Result<()> {
        self.ctx.click(&Self::back_to_login_link()).await
    }

    // ========== 查询 ==========

    pub async fn is_loaded(&self) -> bool {
        self.ctx.is_visible(&Self::heading()).await || self.ctx.is_visible(&Self::email_input()).await
    }

    pub async fn is_email_error_visible(&self) -> bool {
        self.ctx.is_visible(&Self::email_error()).await
    }

    pub async fn get_email_error_text(&self) -> String {
        self.ctx.text_of(&Self::email_error()).await
    }

    /// 验证码输入区域是否出现（等待整个元素超时，请求验证码可能较慢）
    pub async fn is_otp_screen_visible(&self) -> bool {
        let timeout = self.ctx.config().element_wait().timeout;
        self.ctx.is_visible_within(&Self::otp_input(), timeout).await
    }

    pub async fn is_otp_error_visible(&self) -> bool {
        self.ctx.is_visible(&Self::otp_error()).await
    }

    pub async fn is_resend_otp_enabled(&self) -> bool {
        self.ctx.is_enabled(&Self::resend_otp_link()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake::{ClickEffect, FakeDom, FakeElement};
    use crate::pages::testing::context;
    use std::sync::Arc;

    #[tokio::test]
    async fn requesting_otp_reveals_otp_screen() {
        let dom = Arc::new(FakeDom::new());
        dom.add(Strategy::css("input[type='email']"), FakeElement::visible(""));
        dom.add(Strategy::role_named("button", "Send OTP"), FakeElement::visible("Send OTP"));
        dom.on_click(
            Strategy::role_named("button", "Send OTP"),
            ClickEffect::Show(Strategy::css("input[formcontrolname='otp']"), FakeElement::visible("")),
        );
        let page = ForgotPasswordPage::new(context(dom.clone()));

        assert!(page.is_loaded().await);
        assert!(!page.is_otp_screen_visible().await);
        page.enter_email("ops@example.test").await.unwrap();
        page.click_request_otp().await.unwrap();

        assert!(page.is_otp_screen_visible().await);
        assert_eq!(dom.clicks(), vec!["request OTP button"]);
    }

    #[tokio::test]
    async fn split_otp_boxes_are_filled_digit_by_digit() {
        let dom = Arc::new(FakeDom::new());
        for _ in 0..4 {
            dom.add(Strategy::css(SPLIT_OTP_CSS), FakeElement::visible(""));
        }
        let page = ForgotPasswordPage::new(context(dom.clone()));

        page.enter_otp("1234").await.unwrap();

        let fills = dom.fills();
        assert_eq!(fills.len(), 4);
        assert_eq!(fills[3], ("OTP digit 4".to_string(), "4".to_string()));
        assert_eq!(
            dom.element(&Strategy::css(SPLIT_OTP_CSS), 2).unwrap().value,
            "3"
        );
        assert!(page.enter_otp("123456").await.is_err());
    }

    #[tokio::test]
    async fn email_error_text_is_read() {
        let dom = Arc::new(FakeDom::new());
        dom.add(Strategy::css(".email-error"), FakeElement::visible("Email is required"));
        let page = ForgotPasswordPage::new(context(dom));

        assert!(page.is_email_error_visible().await);
        assert_eq!(page.get_email_error_text().await, "Email is required");
        assert!(!page.is_otp_error_visible().await);
    }

    #[tokio::test]
    async fn resend_is_clicked_only_once_enabled() {
        let dom = Arc::new(FakeDom::new());
        let resend = Strategy::role_named("button", "Resend");
        dom.add(resend.clone(), FakeElement::visible("Resend OTP in 30s").disabled());
        let page = ForgotPasswordPage::new(context(dom.clone()));

        assert!(!page.is_resend_otp_enabled().await);

        let dom = Arc::new(FakeDom::new());
        dom.add(resend, FakeElement::visible("Resend OTP"));
        let page = ForgotPasswordPage::new(context(dom.clone()));

        assert!(page.is_resend_otp_enabled().await);
        page.click_resend_otp().await.unwrap();
        assert_eq!(dom.clicks(), vec!["resend OTP link"]);
    }

    #[tokio::test]
    async fn back_to_login_navigates_away() {
        let dom = Arc::new(FakeDom::new());
        dom.set_url("https://admin.example.test/forgot-password");
        dom.add(Strategy::css("a[href*='login']"), FakeElement::visible("Back to Login"));
        dom.on_click(
            Strategy::css("a[href*='login']"),
            ClickEffect::Navigate("https://admin.example.test/login".to_string()),
        );
        let page = ForgotPasswordPage::new(context(dom.clone()));

        page.click_back_to_login().await.unwrap();

        assert_eq!(dom.clicks(), vec!["back to login link"]);
        assert!(page.ctx().current_url().await.ends_with("/login"));
    }
}
