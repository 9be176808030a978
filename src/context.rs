//! 调用上下文
//!
//! 每次调用持有自己的不可变快照，派生子上下文时父上下文保持不变。
//! 截止时间与取消令牌由子上下文原样继承，本模块不检查也不修改它们。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tonic::metadata::MetadataMap;

use crate::record::CorrelationRecord;

/// 调用上下文
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    correlation: Option<Arc<CorrelationRecord>>,
    outgoing: Option<MetadataMap>,
    deadline: Option<Instant>,
    cancellation: CancellationToken,
    trace: opentelemetry::Context,
}

impl CallContext {
    /// 空的根上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 以当前 OpenTelemetry 上下文为追踪来源的根上下文
    pub fn current() -> Self {
        Self {
            trace: opentelemetry::Context::current(),
            ..Self::default()
        }
    }

    pub fn correlation(&self) -> Option<&CorrelationRecord> {
        self.correlation.as_deref()
    }

    pub fn outgoing_metadata(&self) -> Option<&MetadataMap> {
        self.outgoing.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 距离截止时间的剩余时长，已过期时为零
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn trace_context(&self) -> &opentelemetry::Context {
        &self.trace
    }

    /// 派生携带关联记录的子上下文
    pub fn with_correlation(&self, record: CorrelationRecord) -> Self {
        Self {
            correlation: Some(Arc::new(record)),
            ..self.clone()
        }
    }

    /// 派生携带出站元数据的子上下文
    pub fn with_outgoing_metadata(&self, metadata: MetadataMap) -> Self {
        Self {
            outgoing: Some(metadata),
            ..self.clone()
        }
    }

    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..self.clone()
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancellation_token(&self, token: CancellationToken) -> Self {
        Self {
            cancellation: token,
            ..self.clone()
        }
    }

    pub fn with_trace_context(&self, trace: opentelemetry::Context) -> Self {
        Self {
            trace,
            ..self.clone()
        }
    }
}
