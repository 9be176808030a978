use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorrelationConfig {
    pub service: ServiceConfig,
    pub policy: CorrelationPolicy,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    /// 组件名，例如 grpc / http
    pub component: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            component: "grpc".to_string(),
        }
    }
}

/// 关联字段的取值策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorrelationPolicy {
    /// user_id 为空时使用 session_id 代替（默认关闭）
    pub user_id_fallback_to_session_id: bool,
}

impl CorrelationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id_fallback_to_session_id(mut self, enable: bool) -> Self {
        self.user_id_fallback_to_session_id = enable;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `RUST_LOG` 未设置时使用的过滤级别
    pub level: String,
    /// 是否输出 JSON 格式日志
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CorrelationConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CorrelationConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service.name = name.into();
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.service.component = component.into();
        self
    }

    pub fn with_policy(mut self, policy: CorrelationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}
