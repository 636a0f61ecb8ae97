//! 提示消息读取

use std::time::Duration;

use tracing::{debug, info};

use crate::locator::Locator;
use crate::models::Toast;
use crate::pages::PageContext;
use crate::utils::logging::truncate_text;

pub fn toast_locator() -> Locator {
    Locator::new("toast message")
        .css(".toast-message")
        .css("#toast-container .toast")
        .css(".mat-mdc-snack-bar-label")
        .css("simple-snack-bar")
        .css(".Toastify__toast")
        .css(".ant-message-notice")
        .css(".swal2-popup")
        .role("alert")
}

/// 提示框外层容器；类型 class（如 `toast-error`）挂在这一层上
const TOAST_CONTAINER_CSS: &str = ".ngx-toastr, .toast, mat-snack-bar-container, .mat-mdc-snack-bar-container, \
.Toastify__toast, .ant-message-notice, .swal2-popup, [role='alert']";

/// 在 toast 超时内等待提示出现
pub async fn wait_for_toast(ctx: &PageContext) -> Option<Toast> {
    let timeout = ctx.config().toast_wait().timeout;
    wait_for_toast_within(ctx, timeout).await
}

pub async fn wait_for_toast_within(ctx: &PageContext, timeout: Duration) -> Option<Toast> {
    let locator = toast_locator();
    let target = match ctx.resolver().resolve_within(&locator, timeout).await {
        Ok(target) => target,
        Err(_) => {
            debug!("{}ms 内没有出现提示消息", timeout.as_millis());
            return None;
        }
    };
    let text = ctx.dom().text(&target).await.ok()?;
    let dom = ctx.dom();
    let own_class = dom.attribute(&target, "class").await.ok().flatten();
    let container_class = dom
        .container_class(&target, TOAST_CONTAINER_CSS)
        .await
        .ok()
        .flatten();
    let class_attr = [container_class, own_class]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let toast = Toast::classify(&class_attr, &text);
    info!("💬 提示消息 ({:?}): {}", toast.kind, truncate_text(&toast.text, 80));
    Some(toast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake::{FakeDom, FakeElement};
    use crate::locator::Strategy;
    use crate::models::ToastKind;
    use crate::pages::testing::context;
    use std::sync::Arc;

    #[tokio::test]
    async fn reads_kind_from_container_class() {
        let dom = Arc::new(FakeDom::new());
        dom.add(
            Strategy::css(".toast-message"),
            FakeElement::visible("Email is not registered")
                .with_attr("class", "toast-message")
                .inside("ngx-toastr toast-error"),
        );

        let toast = wait_for_toast(&context(dom)).await.unwrap();

        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.text, "Email is not registered");
    }

    #[tokio::test]
    async fn snack_bar_without_type_class_falls_back_to_text() {
        let dom = Arc::new(FakeDom::new());
        dom.add(
            Strategy::css(".mat-mdc-snack-bar-label"),
            FakeElement::visible("Subscription created successfully")
                .inside("mat-mdc-snack-bar-container"),
        );

        let toast = wait_for_toast(&context(dom)).await.unwrap();

        assert!(toast.is_success());
    }

    #[tokio::test]
    async fn returns_none_when_no_toast_shows_up() {
        let dom = Arc::new(FakeDom::new());
        assert!(wait_for_toast(&context(dom)).await.is_none());
    }
}
