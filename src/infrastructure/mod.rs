pub mod dom;
pub mod js_executor;
pub mod scripts;

#[cfg(test)]
pub(crate) mod fake;

pub use dom::{Dom, Probe};
pub use js_executor::JsExecutor;
