//! 登录页（管理端与合作伙伴端共用同一套页面结构）

use anyhow::{Context, Result};
use tracing::info;

use crate::locator::{Locator, Strategy};
use crate::models::LoginForm;
use crate::pages::components::toast;
use crate::pages::PageContext;

pub const LOGIN_ROUTE: &str = "/login";

pub struct LoginPage {
    ctx: PageContext,
}

impl LoginPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    pub fn ctx(&self) -> &PageContext {
        &self.ctx
    }

    // ========== 定位器 ==========

    fn email_input() -> Locator {
        Locator::new("email input")
            .css("input[formcontrolname='email']")
            .css("input[type='email']")
            .css("input[name='email']")
            .placeholder("Email")
            .label("Email")
    }

    fn password_input() -> Locator {
        Locator::new("password input")
            .css("input[formcontrolname='password']")
            .css("input[type='password']")
            .placeholder("Password")
            .label("Password")
    }

    fn login_button() -> Locator {
        Locator::new("login button")
            .test_id("login-button")
            .css("button[type='submit']")
            .role_named("button", "Login")
            .role_named("button", "Sign in")
            .with(Strategy::text_in("button", "Log in"))
    }

    fn forgot_password_link() -> Locator {
        Locator::new("forgot password link")
            .css("a[routerlink*='forgot']")
            .css("a[href*='forgot']")
            .with(Strategy::text_in("a, button, span", "Forgot Password"))
            .role_named("link", "Forgot")
    }

    fn email_error() -> Locator {
        Locator::new("email error")
            .css("mat-form-field:has(input[formcontrolname='email']) mat-error")
            .css("input[formcontrolname='email'] ~ .invalid-feedback")
            .css("input[type='email'] ~ .text-danger")
            .css(".email-error")
            .text("Email is required")
            .text("valid email")
    }

    fn password_error() -> Locator {
        Locator::new("password error")
            .css("mat-form-field:has(input[formcontrolname='password']) mat-error")
            .css("input[formcontrolname='password'] ~ .invalid-feedback")
            .css("input[type='password'] ~ .text-danger")
            .css(".password-error")
            .text("Password is required")
    }

    fn form_error() -> Locator {
        Locator::new("login error message")
            .css(".alert-danger")
            .css(".login-error")
            .css(".error-message")
            .css("form mat-error")
            .role("alert")
    }

    fn logged_in_marker() -> Locator {
        Locator::new("portal shell")
            .css("app-sidebar")
            .css(".sidebar")
            .css("nav.sidenav")
            .css("mat-sidenav")
            .css("app-dashboard")
    }

    // ========== 操作 ==========

    pub async fn open(&self) -> Result<()> {
        self.ctx.navigate(LOGIN_ROUTE).await?;
        self.ctx
            .locate(&Self::email_input())
            .await
            .with_context(|| format!("{} 登录页没有加载", self.ctx.portal().label()))?;
        Ok(())
    }

    pub async fn enter_email(&self, email: &str) -> Result<()> {
        self.ctx.fill(&Self::email_input(), email).await
    }

    pub async fn enter_password(&self, password: &str) -> Result<()> {
        self.ctx.fill(&Self::password_input(), password).await
    }

    pub async fn click_login(&self) -> Result<()> {
        self.ctx.click(&Self::login_button()).await
    }

    /// 填写账号密码并提交（空字段同样会被写入，以触发校验）
    pub async fn login(&self, form: &LoginForm) -> Result<()> {
        self.enter_email(&form.email).await?;
        self.enter_password(&form.password).await?;
        self.click_login().await?;
        info!("🔐 已提交 {} 登录表单 ({})", self.ctx.portal().label(), form.email);
        Ok(())
    }

    pub async fn click_forgot_password(&self) -> Result<()> {
        self.ctx.click(&Self::forgot_password_link()).await
    }

    // ========== 查询 ==========

    pub async fn is_email_error_visible(&self) -> bool {
        self.ctx.is_visible(&Self::email_error()).await
    }

    pub async fn is_password_error_visible(&self) -> bool {
        self.ctx.is_visible(&Self::password_error()).await
    }

    /// 表单上的错误文本，没有时退回到提示消息
    pub async fn get_error_message(&self) -> String {
        let text = self.ctx.text_of(&Self::form_error()).await;
        if !text.is_empty() {
            return text;
        }
        let timeout = self.ctx.config().query_wait().timeout;
        toast::wait_for_toast_within(&self.ctx, timeout)
            .await
            .map(|t| t.text)
            .unwrap_or_default()
    }

    pub async fn is_login_button_enabled(&self) -> bool {
        self.ctx.is_enabled(&Self::login_button()).await
    }

    /// 已离开登录路由，或者门户框架（侧边栏等）已出现
    pub async fn is_logged_in(&self) -> bool {
        let timeout = self.ctx.config().element_wait().timeout;
        if self
            .ctx
            .wait_for_url(timeout, |url| !url.is_empty() && !url.contains(LOGIN_ROUTE))
            .await
        {
            return true;
        }
        self.ctx.is_visible(&Self::logged_in_marker()).await
    }
}
