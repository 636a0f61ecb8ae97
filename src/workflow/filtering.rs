//! 关键字筛选校验

use crate::models::TableRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterVerification {
    pub matched: usize,
    pub total: usize,
    /// 没有任何行时为 `false`
    pub all_match: bool,
}

/// 每一行是否都包含关键字（不区分大小写）
pub fn verify_keyword_filter(rows: &[TableRow], keyword: &str) -> FilterVerification {
    let matched = rows.iter().filter(|row| row.contains(keyword)).count();
    FilterVerification {
        matched,
        total: rows.len(),
        all_match: !rows.is_empty() && matched == rows.len(),
    }
}

/// 指定列的值是否都等于期望值（不区分大小写，去掉首尾空白）
pub fn verify_column_filter(values: &[String], expected: &str) -> FilterVerification {
    let want = expected.trim().to_lowercase();
    let matched = values
        .iter()
        .filter(|v| v.trim().to_lowercase() == want)
        .count();
    FilterVerification {
        matched,
        total: values.len(),
        all_match: !values.is_empty() && matched == values.len(),
    }
}
