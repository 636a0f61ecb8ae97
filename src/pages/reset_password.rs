//! 重置密码页

use anyhow::Result;

use crate::locator::{Locator, Strategy};
use crate::models::ResetPasswordForm;
use crate::pages::PageContext;

pub const RESET_PASSWORD_ROUTE: &str = "/reset-password";

const VALIDATION_CSS: &str = "mat-error, .invalid-feedback, .text-danger, .error-message";

pub struct ResetPasswordPage {
    ctx: PageContext,
}

impl ResetPasswordPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    pub fn ctx(&self) -> &PageContext {
        &self.ctx
    }

    fn password_input() -> Locator {
        Locator::new("new password input")
            .css("input[formcontrolname='newPassword']")
            .css("input[formcontrolname='password']")
            .placeholder("New Password")
            .xpath("(//input[@type='password'])[1]")
    }

    fn confirm_password_input() -> Locator {
        Locator::new("confirm password input")
            .css("input[formcontrolname='confirmPassword']")
            .placeholder("Confirm")
            .label("Confirm Password")
            .xpath("(//input[@type='password'])[2]")
    }

    fn submit_button() -> Locator {
        Locator::new("reset password button")
            .role_named("button", "Reset Password")
            .role_named("button", "Submit")
            .role_named("button", "Update Password")
            .css("button[type='submit']")
    }

    fn password_error() -> Locator {
        Locator::new("new password error")
            .css("mat-form-field:has(input[formcontrolname='newPassword']) mat-error")
            .css("mat-form-field:has(input[formcontrolname='password']) mat-error")
            .css("input[formcontrolname='newPassword'] ~ .invalid-feedback")
            .text("Password is required")
            .text("at least 8 characters")
    }

    fn confirm_password_error() -> Locator {
        Locator::new("confirm password error")
            .css("mat-form-field:has(input[formcontrolname='confirmPassword']) mat-error")
            .css("input[formcontrolname='confirmPassword'] ~ .invalid-feedback")
            .css(".confirm-password-error")
            .text("do not match")
            .text("must match")
    }

    fn form_marker() -> Locator {
        Locator::new("reset password form")
            .css("app-reset-password")
            .css("form[formgroup*='reset' i]")
            .with(Strategy::text_in("h1, h2, h3, h4, mat-card-title", "Reset Password"))
            .with(Strategy::text_in("h1, h2, h3, h4, mat-card-title", "Set New Password"))
    }

    // ========== 操作 ==========

    pub async fn enter_password(&self, password: &str) -> Result<()> {
        self.ctx.fill(&Self::password_input(), password).await
    }

    pub async fn enter_confirm_password(&self, password: &str) -> Result<()> {
        self.ctx.fill(&Self::confirm_password_input(), password).await
    }

    pub async fn fill_reset_form(&self, form: &ResetPasswordForm) -> Result<()> {
        self.enter_password(&form.password).await?;
        self.enter_confirm_password(&form.confirm_password).await
    }

    pub async fn click_submit(&self) -> Result<()> {
        self.ctx.click(&Self::submit_button()).await
    }

    // ========== 查询 ==========

    /// 表单标记出现，或者 URL 仍在重置密码路由上
    pub async fn is_loaded(&self) -> bool {
        self.ctx.current_url().await.contains(RESET_PASSWORD_ROUTE)
            || self.ctx.is_visible(&Self::form_marker()).await
            || self.ctx.is_visible(&Self::confirm_password_input()).await
    }

    pub async fn is_password_error_visible(&self) -> bool {
        self.ctx.is_visible(&Self::password_error()).await
    }

    pub async fn is_confirm_password_error_visible(&self) -> bool {
        self.ctx.is_visible(&Self::confirm_password_error()).await
    }

    /// 表单上所有可见的校验提示
    pub async fn get_validation_messages(&self) -> Vec<String> {
        self.ctx
            .texts(&Locator::new("validation messages").css(VALIDATION_CSS))
            .await
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake::{ClickEffect, FakeDom, FakeElement};
    use crate::pages::testing::context;
    use std::sync::Arc;

    #[tokio::test]
    async fn mismatched_passwords_surface_confirm_error() {
        let dom = Arc::new(FakeDom::new());
        dom.add(Strategy::css("input[formcontrolname='newPassword']"), FakeElement::visible(""));
        dom.add(Strategy::css("input[formcontrolname='confirmPassword']"), FakeElement::visible(""));
        dom.add(Strategy::css("button[type='submit']"), FakeElement::visible("Submit"));
        dom.on_click(
            Strategy::css("button[type='submit']"),
            ClickEffect::Show(
                Strategy::css(VALIDATION_CSS),
                FakeElement::visible("Passwords do not match"),
            ),
        );
        dom.on_click(
            Strategy::css("button[type='submit']"),
            ClickEffect::Show(
                Strategy::css(".confirm-password-error"),
                FakeElement::visible("Passwords do not match"),
            ),
        );
        let page = ResetPasswordPage::new(context(dom.clone()));

        assert!(page.is_loaded().await);
        page.fill_reset_form(&ResetPasswordForm::new("Passw0rd!", "Different1!"))
            .await
            .unwrap();
        page.click_submit().await.unwrap();

        assert!(page.is_confirm_password_error_visible().await);
        assert!(!page.is_password_error_visible().await);
        assert_eq!(page.get_validation_messages().await, vec!["Passwords do not match"]);
        assert_eq!(
            dom.fills(),
            vec![
                ("new password input".to_string(), "Passw0rd!".to_string()),
                ("confirm password input".to_string(), "Different1!".to_string()),
            ]
        );
    }
}
