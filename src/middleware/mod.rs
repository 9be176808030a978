//! 中间件模块
//!
//! 提供关联字段提取的 tower 中间件

pub mod correlation;

pub use correlation::{CorrelationLayer, CorrelationService};
