//! 日志字段组装
//!
//! 把关联记录与当前 span 的 trace_id / span_id 合并成稀疏的字段映射：
//! 空值或无效 span 对应的键直接省略，从不输出空字符串。

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use opentelemetry::trace::{SpanContext, TraceContextExt};
use serde::Serialize;

use crate::config::CorrelationPolicy;
use crate::context::CallContext;

pub const TRACE_ID_KEY: &str = "trace_id";
pub const SPAN_ID_KEY: &str = "span_id";

/// 日志字段映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LogFields(BTreeMap<&'static str, String>);

impl LogFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// 仅在值非空时插入
    pub fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.0.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }
}

/// 追踪信息提供者
pub trait TraceProvider: Send + Sync {
    /// 上下文中活跃 span 的 SpanContext（可能无效）
    fn span_context(&self, ctx: &CallContext) -> Option<SpanContext>;
}

/// 从 OpenTelemetry 上下文读取活跃 span
#[derive(Debug, Clone, Copy, Default)]
pub struct OtelTraceProvider;

impl TraceProvider for OtelTraceProvider {
    fn span_context(&self, ctx: &CallContext) -> Option<SpanContext> {
        let trace = ctx.trace_context();
        if !trace.has_active_span() {
            return None;
        }
        Some(trace.span().span_context().clone())
    }
}

/// 日志字段组装器
#[derive(Clone)]
pub struct LogFieldComposer {
    traces: Arc<dyn TraceProvider>,
    policy: CorrelationPolicy,
}

impl LogFieldComposer {
    pub fn new() -> Self {
        Self::with_trace_provider(Arc::new(OtelTraceProvider))
    }

    pub fn with_trace_provider(traces: Arc<dyn TraceProvider>) -> Self {
        Self {
            traces,
            policy: CorrelationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CorrelationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 组装字段，不修改上下文
    pub fn compose(&self, ctx: &CallContext) -> LogFields {
        let mut fields = LogFields::new();

        if let Some(record) = ctx.correlation() {
            let record = record.effective(&self.policy);
            for (field, value) in record.entries() {
                fields.insert(field.log_key(), value);
            }
        }

        if let Some(span) = self.traces.span_context(ctx).filter(SpanContext::is_valid) {
            fields.insert(TRACE_ID_KEY, span.trace_id().to_string());
            fields.insert(SPAN_ID_KEY, span.span_id().to_string());
        }

        fields
    }
}

impl Default for LogFieldComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogFieldComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFieldComposer")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
