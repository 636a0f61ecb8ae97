//! 表单数据
//!
//! 仅在场景内短暂存在，工具本身不做持久化。

use crate::config::PortalConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn from_portal(portal: &PortalConfig) -> Self {
        Self::new(portal.email.clone(), portal.password.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn new(password: impl Into<String>, confirm_password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

/// 新增/编辑订阅弹窗中的字段，`None` 表示不填写
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionForm {
    pub customer: Option<String>,
    pub plan: Option<String>,
    pub billing_cycle: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    pub licenses: Option<u32>,
}

impl SubscriptionForm {
    pub fn new(customer: impl Into<String>, plan: impl Into<String>) -> Self {
        Self {
            customer: Some(customer.into()),
            plan: Some(plan.into()),
            ..Default::default()
        }
    }

    pub fn billing_cycle(mut self, cycle: impl Into<String>) -> Self {
        self.billing_cycle = Some(cycle.into());
        self
    }

    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    pub fn licenses(mut self, licenses: u32) -> Self {
        self.licenses = Some(licenses);
        self
    }
}
