//! 日志模块
//!
//! - [`init_logging`] 安装全局 `tracing-subscriber`
//! - [`RequestLogger`] 携带关联字段的请求级日志句柄（基于 `tracing::Span`）
//! - [`default_logger`] 无关联字段时共享的进程级默认句柄

use std::future::Future;
use std::sync::OnceLock;

use tracing::instrument::Instrumented;
use tracing::{Instrument, Span, debug, field};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;
use crate::context::CallContext;
use crate::error::{CorrelationError, Result};
use crate::fields::{LogFieldComposer, LogFields};

static DEFAULT_LOGGER: OnceLock<RequestLogger> = OnceLock::new();

/// 请求级日志句柄
///
/// 在 span 内输出的日志都会带上构造时的字段。
#[derive(Debug, Clone)]
pub struct RequestLogger {
    span: Span,
    fields: LogFields,
}

impl RequestLogger {
    pub fn from_fields(fields: LogFields) -> Self {
        let span = tracing::info_span!(
            "request",
            request_id = field::Empty,
            session_id = field::Empty,
            user_id = field::Empty,
            trace_id = field::Empty,
            span_id = field::Empty,
        );
        for (key, value) in fields.iter() {
            span.record(key, value);
        }
        Self { span, fields }
    }

    pub(crate) fn from_parts(span: Span, fields: LogFields) -> Self {
        Self { span, fields }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn fields(&self) -> &LogFields {
        &self.fields
    }

    pub fn in_scope<F, T>(&self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.span.in_scope(f)
    }

    pub fn instrument<F>(&self, future: F) -> Instrumented<F>
    where
        F: Future,
    {
        future.instrument(self.span.clone())
    }
}

/// 进程级默认日志句柄（不带任何字段）
pub fn default_logger() -> &'static RequestLogger {
    DEFAULT_LOGGER.get_or_init(|| RequestLogger {
        span: Span::none(),
        fields: LogFields::default(),
    })
}

/// 根据字段选择日志句柄：字段为空时直接返回默认句柄
pub fn logger_for(fields: LogFields) -> RequestLogger {
    if fields.is_empty() {
        return default_logger().clone();
    }
    RequestLogger::from_fields(fields)
}

/// 为调用上下文构造日志句柄
pub fn logger_for_context(composer: &LogFieldComposer, ctx: &CallContext) -> RequestLogger {
    logger_for(composer.compose(ctx))
}

/// 初始化全局日志
///
/// 优先使用 `RUST_LOG`，否则使用配置中的级别。重复调用时保持已安装的订阅者不变。
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| CorrelationError::logging(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry
            .with(fmt::layer().json().flatten_event(true))
            .try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    if let Err(e) = installed {
        debug!(error = %e, "Global subscriber already installed, keeping it");
    }

    Ok(())
}
