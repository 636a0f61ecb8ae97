/// 表格某一行在某一时刻的快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    /// 行在当前页中的下标（从 0 开始）
    pub index: usize,
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn new(index: usize, cells: Vec<String>) -> Self {
        Self { index, cells }
    }

    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// 整行文本是否包含关键字（不区分大小写）
    pub fn contains(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        self.cells
            .iter()
            .any(|cell| cell.to_lowercase().contains(&keyword))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `aria-sort` 属性对应的值
    pub fn aria_value(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_case_insensitive_across_cells() {
        let row = TableRow::new(0, vec!["Acme Corp".into(), "Enterprise".into()]);
        assert!(row.contains("acme"));
        assert!(row.contains(" ENTERPRISE "));
        assert!(!row.contains("globex"));
        assert_eq!(row.cell(1), Some("Enterprise"));
        assert_eq!(row.cell(5), None);
    }
}
