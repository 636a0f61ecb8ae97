//! 排序校验

use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;
use tracing::{info, warn};

use crate::models::SortDirection;
use crate::pages::components::DataTable;
use crate::pages::PageContext;
use crate::utils::wait::wait_for;

#[derive(Debug, Clone, PartialEq)]
pub struct SortVerification {
    pub is_sorted: bool,
    /// 每个逆序位置一条说明
    pub errors: Vec<String>,
    pub values: Vec<f64>,
}

fn numeric_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\()?\s*([-−])?\s*\p{Sc}?\s*([-−])?\s*(\d[\d,]*(?:\.\d+)?|\.\d+)\s*%?\s*(\))?").ok()
    })
    .as_ref()
}

/// 取单元格中的第一个数字，去掉货币符号、千分位、百分号
///
/// `"$1,200.50"` → `1200.5`，`"(300)"` → `-300`，`"$300.00 (2 seats)"` → `300`，
/// 无法解析时返回 `None`
pub fn normalize_numeric(raw: &str) -> Option<f64> {
    let caps = numeric_regex()?.captures(raw.trim())?;
    let value: f64 = caps[4].replace(',', "").parse().ok()?;
    let signed = caps.get(2).is_some() || caps.get(3).is_some();
    let parenthesized = caps.get(1).is_some() && caps.get(5).is_some();
    Some(if signed || parenthesized { -value } else { value })
}

fn verify(values: &[f64], direction: SortDirection) -> SortVerification {
    let errors: Vec<String> = values
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let (a, b) = (pair[0], pair[1]);
            let out_of_order = match direction {
                SortDirection::Descending => a < b,
                SortDirection::Ascending => a > b,
            };
            out_of_order.then(|| {
                format!(
                    "第 {} 行 ({}) 与第 {} 行 ({}) 不符合{}顺序",
                    i + 1,
                    a,
                    i + 2,
                    b,
                    match direction {
                        SortDirection::Descending => "降序",
                        SortDirection::Ascending => "升序",
                    }
                )
            })
        })
        .collect();
    SortVerification {
        is_sorted: errors.is_empty(),
        errors,
        values: values.to_vec(),
    }
}

pub fn verify_descending_sort(values: &[f64]) -> SortVerification {
    verify(values, SortDirection::Descending)
}

pub fn verify_ascending_sort(values: &[f64]) -> SortVerification {
    verify(values, SortDirection::Ascending)
}

/// 点击表头直到达到目标排序方向，然后读取该列
///
/// 排序状态无法从 `aria-sort` 读出时，以点击次数为准（第一次升序、第二次降序）。
pub async fn sort_column_and_read(
    ctx: &PageContext,
    table: &DataTable,
    header: &str,
    direction: SortDirection,
) -> Result<Vec<String>> {
    let clicks_without_state = match direction {
        SortDirection::Ascending => 1,
        SortDirection::Descending => 2,
    };

    for click in 1..=3 {
        let before = table.column_values(ctx, header).await;
        table.sort_by(ctx, header).await?;
        // 等待列内容变化，避免读到排序前的数据
        let query = ctx.config().query_wait();
        wait_for(&query, || async { table.column_values(ctx, header).await != before }).await;

        match table.sort_state(ctx, header).await {
            Some(state) if state == direction => break,
            Some(_) => continue,
            None if click >= clicks_without_state => break,
            None => continue,
        }
    }

    let values = table.column_values(ctx, header).await;
    info!("↕️ 列 '{}' {:?} 共 {} 个值", header, direction, values.len());
    Ok(values)
}

/// 排序后读取列并校验顺序，非数字单元格跳过
pub async fn verify_column_sort(
    ctx: &PageContext,
    table: &DataTable,
    header: &str,
    direction: SortDirection,
) -> Result<SortVerification> {
    let raw = sort_column_and_read(ctx, table, header, direction).await?;
    let values: Vec<f64> = raw.iter().filter_map(|v| normalize_numeric(v)).collect();
    if values.len() < raw.len() {
        warn!("⚠️ 列 '{}' 中有 {} 个值无法解析为数字", header, raw.len() - values.len());
    }
    Ok(verify(&values, direction))
}
