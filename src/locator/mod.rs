//! 元素定位层
//!
//! 每个逻辑元素对应一个 [`Locator`]（有序候选策略集合），
//! 由 [`Resolver`] 在限定时间内解析为唯一的 [`Resolved`] 句柄。

pub mod resolver;
pub mod strategy;

pub use resolver::Resolver;
pub use strategy::{Fallback, Locator, Resolved, Strategy};
