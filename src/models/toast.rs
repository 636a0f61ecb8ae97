/// 提示消息（toast）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl Toast {
    /// 根据容器的 class 与文本判断类型，class 优先
    pub fn classify(class_attr: &str, text: &str) -> Self {
        let class_attr = class_attr.to_lowercase();
        let kind = if ["error", "danger", "failure"]
            .iter()
            .any(|k| class_attr.contains(k))
        {
            ToastKind::Error
        } else if class_attr.contains("success") {
            ToastKind::Success
        } else if class_attr.contains("warn") {
            ToastKind::Warning
        } else {
            Self::kind_from_text(text)
        };
        Self {
            kind,
            text: text.trim().to_string(),
        }
    }

    fn kind_from_text(text: &str) -> ToastKind {
        let text = text.to_lowercase();
        const ERROR_WORDS: [&str; 6] = ["error", "failed", "invalid", "not match", "do not match", "unable"];
        const SUCCESS_WORDS: [&str; 5] = ["success", "created", "updated", "deleted", "saved"];
        if ERROR_WORDS.iter().any(|w| text.contains(w)) {
            ToastKind::Error
        } else if SUCCESS_WORDS.iter().any(|w| text.contains(w)) {
            ToastKind::Success
        } else {
            ToastKind::Info
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == ToastKind::Error
    }

    pub fn is_success(&self) -> bool {
        self.kind == ToastKind::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_takes_precedence_over_text() {
        let toast = Toast::classify("toast toast-error ng-trigger", "Subscription created");
        assert!(toast.is_error());
    }

    #[test]
    fn falls_back_to_text_keywords() {
        assert!(Toast::classify("mat-mdc-snack-bar-label", " Subscription created successfully ").is_success());
        assert!(Toast::classify("", "Passwords do not match").is_error());
        assert_eq!(Toast::classify("", "OTP sent to your email").kind, ToastKind::Info);
        assert_eq!(Toast::classify("alert-warning", "x").kind, ToastKind::Warning);
    }
}
