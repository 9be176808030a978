//! 错误处理模块
//!
//! 关联传播路径上的读取一律降级为空值，不向调用方暴露错误；
//! 错误类型只用于配置和日志等外围设施。

pub mod correlation_error;

pub use correlation_error::{CorrelationError, Result};
