//! 业务事件日志
//!
//! 统一业务事件的字段结构（event / service / component / action / entity，
//! 可选 reason / outcome 以及自定义字段）。[`BusinessEvent::logger`] 返回挂在
//! 请求 span 之下的子句柄，调用方自行选择级别和消息输出日志。

use serde_json::{Map, Value};
use tracing::field;

use crate::config::ServiceConfig;
use crate::logging::RequestLogger;

/// 事件 span 上声明的字段
const EVENT_KEYS: [&str; 7] = [
    "event",
    "service",
    "component",
    "action",
    "entity",
    "reason",
    "outcome",
];

/// 未声明字段以 JSON 对象形式记录在该字段中
const EXTRA_KEY: &str = "extra";

/// 业务事件
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessEvent {
    event: String,
    service: String,
    component: String,
    action: String,
    entity: String,
    reason: String,
    outcome: String,
    extra: Map<String, Value>,
}

impl BusinessEvent {
    pub fn new(
        service: &ServiceConfig,
        event: impl Into<String>,
        action: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            event: event.into(),
            service: service.name.clone(),
            component: service.component.clone(),
            action: action.into(),
            entity: entity.into(),
            reason: String::new(),
            outcome: String::new(),
            extra: Map::new(),
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = outcome.into();
        self
    }

    /// 附加自定义字段，同名时覆盖基础字段
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.event
    }

    /// 事件字段（reason / outcome 为空时省略）
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("event".to_string(), Value::from(self.event.as_str()));
        fields.insert("service".to_string(), Value::from(self.service.as_str()));
        fields.insert("component".to_string(), Value::from(self.component.as_str()));
        fields.insert("action".to_string(), Value::from(self.action.as_str()));
        fields.insert("entity".to_string(), Value::from(self.entity.as_str()));
        if !self.reason.is_empty() {
            fields.insert("reason".to_string(), Value::from(self.reason.as_str()));
        }
        if !self.outcome.is_empty() {
            fields.insert("outcome".to_string(), Value::from(self.outcome.as_str()));
        }
        for (key, value) in &self.extra {
            fields.insert(key.clone(), value.clone());
        }
        fields
    }

    /// 派生带有事件字段的日志句柄
    ///
    /// 事件字段作为 span 字段记录；同名的自定义字段覆盖基础字段，
    /// 其余自定义字段合并记录在 `extra` 中。
    pub fn logger(&self, parent: &RequestLogger) -> RequestLogger {
        let span = tracing::info_span!(
            parent: parent.span(),
            "business_event",
            event = %self.event,
            service = %self.service,
            component = %self.component,
            action = %self.action,
            entity = %self.entity,
            reason = field::Empty,
            outcome = field::Empty,
            extra = field::Empty,
        );
        if !self.reason.is_empty() {
            span.record("reason", self.reason.as_str());
        }
        if !self.outcome.is_empty() {
            span.record("outcome", self.outcome.as_str());
        }

        let mut extra = Map::new();
        for (key, value) in &self.extra {
            if EVENT_KEYS.contains(&key.as_str()) {
                span.record(key.as_str(), render(value).as_str());
            } else {
                extra.insert(key.clone(), value.clone());
            }
        }
        if !extra.is_empty() {
            span.record(EXTRA_KEY, Value::Object(extra).to_string().as_str());
        }

        RequestLogger::from_parts(span, parent.fields().clone())
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
