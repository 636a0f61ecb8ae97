//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! suite_runner (处理 Vec<ScenarioDef>，持有浏览器)
//!     ↓
//! scenarios (单个场景：断言)
//!     ↓
//! workflow (跨页面的组合操作)
//!     ↓
//! pages (页面对象与组件)
//!     ↓
//! locator (候选选择器解析)
//!     ↓
//! infrastructure (Dom / JsExecutor)
//! ```
//!
//! 只有编排层持有 Browser；场景与页面对象只通过 `PageContext` 访问页面。

pub mod suite_runner;

pub use suite_runner::{run_scenario, RunStats, SuiteRunner, SUMMARY_FILE};
