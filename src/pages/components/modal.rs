//! 弹窗

use std::time::Duration;

use anyhow::Result;

use crate::locator::Locator;
use crate::pages::PageContext;

pub fn modal_locator() -> Locator {
    Locator::new("modal dialog")
        .css("mat-dialog-container")
        .css(".mat-mdc-dialog-container")
        .css(".modal.show .modal-content")
        .css(".ant-modal-content")
        .role("dialog")
}

pub fn modal_title() -> Locator {
    Locator::new("modal title")
        .css("mat-dialog-container h2")
        .css(".mat-mdc-dialog-title")
        .css(".modal.show .modal-title")
        .css("[role='dialog'] h2")
}

pub async fn is_open(ctx: &PageContext) -> bool {
    ctx.is_visible(&modal_locator()).await
}

pub async fn title(ctx: &PageContext) -> String {
    ctx.text_of(&modal_title()).await
}

/// 等待弹窗打开
pub async fn wait_open(ctx: &PageContext) -> Result<()> {
    ctx.locate(&modal_locator()).await?;
    Ok(())
}

/// 等待弹窗关闭
pub async fn wait_closed(ctx: &PageContext, timeout: Duration) -> Result<()> {
    ctx.resolver().wait_hidden(&modal_locator(), timeout).await?;
    Ok(())
}
