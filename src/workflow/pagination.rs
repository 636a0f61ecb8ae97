//! 分页标签解析
//!
//! 支持的格式：
//! - `Showing 1 to 20 of 5502 records`
//! - `21 – 40 of 5502`（Material 分页器，含各种破折号）
//! - 千分位分隔符：`1 - 20 of 5,502`

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::pages::components::DataTable;
use crate::pages::PageContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
    /// 原始标签文本
    pub text: String,
}

impl PaginationRange {
    /// 当前页显示的条数
    pub fn page_size(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            self.end.saturating_sub(self.start) + 1
        }
    }

    pub fn is_last_page(&self) -> bool {
        self.end >= self.total
    }
}

fn range_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)([\d,]+)\s*(?:to|-|–|—|‒)\s*([\d,]+)\s*of\s*([\d,]+)").ok()
    })
    .as_ref()
}

fn number(raw: &str) -> Option<u64> {
    raw.replace(',', "").parse().ok()
}

/// 解析分页标签，无法识别时返回 `None`
pub fn parse_pagination_range(text: &str) -> Option<PaginationRange> {
    let caps = range_regex()?.captures(text)?;
    Some(PaginationRange {
        start: number(&caps[1])?,
        end: number(&caps[2])?,
        total: number(&caps[3])?,
        text: text.trim().to_string(),
    })
}

/// 读取并解析表格的分页标签（查询，不会失败）
pub async fn get_pagination_range(ctx: &PageContext, table: &DataTable) -> Option<PaginationRange> {
    let text = table.pagination_text(ctx).await;
    let range = parse_pagination_range(&text);
    if range.is_none() {
        debug!("无法解析分页标签: '{}'", text);
    }
    range
}
