//! 关联模块统一错误类型
//!
//! 关联传播本身从不失败；这里只覆盖配置加载、日志初始化等外围操作。

use thiserror::Error;

/// 关联模块错误类型
#[derive(Error, Debug)]
pub enum CorrelationError {
    /// IO 错误（读取配置文件等）
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置解析错误
    #[error("配置解析错误: {0}")]
    Config(#[from] toml::de::Error),

    /// 日志初始化错误
    #[error("日志初始化错误: {0}")]
    Logging(String),
}

impl CorrelationError {
    /// 创建日志初始化错误
    pub fn logging(msg: impl Into<String>) -> Self {
        CorrelationError::Logging(msg.into())
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, CorrelationError>;
