//! # Portal E2E
//!
//! 订阅管理系统（管理端、合作伙伴端）的端到端 UI 测试套件
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - `Dom` 接口与基于 CDP 的 `JsExecutor` 实现
//! - `locator/` - 候选选择器列表与解析器（可见优先、超时、兜底策略）
//!
//! ### ② 页面对象层（Pages）
//! - `pages/` - 每个页面一个类型，定位器 + 语义化操作
//! - `pages/components/` - 下拉框、提示消息、表格、弹窗等通用组件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 登录、忘记密码、新增订阅等组合操作，分页/排序/筛选校验
//!
//! ### ④ 场景与编排层（Scenarios / Orchestration）
//! - `scenarios/` - 业务场景与场景登记表
//! - `orchestrator/` - 套件运行器，管理浏览器与并发
//! - `exporter/` - 用例清单导出为 CSV
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod exporter;
pub mod infrastructure;
pub mod locator;
pub mod models;
pub mod orchestrator;
pub mod pages;
pub mod scenarios;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::BrowserSession;
pub use config::{Config, Portal};
pub use error::{AppError, AppResult};
pub use infrastructure::{Dom, JsExecutor};
pub use locator::{Locator, Resolver, Strategy};
pub use orchestrator::{RunStats, SuiteRunner};
pub use pages::PageContext;
pub use scenarios::{all_scenarios, ScenarioDef, ScenarioResult};
