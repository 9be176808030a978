//! Flare IM Correlation Library
//!
//! Carries request/session/user correlation ids across gRPC boundaries: the inbound
//! side extracts them from metadata onto an explicit call context, the outbound side
//! injects them back into metadata, and the log field composer merges them with the
//! active trace/span ids for structured logging.

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod extractor;
pub mod fields;
pub mod injector;
pub mod logging;
pub mod metadata;
pub mod record;

// gRPC 拦截器与中间件
pub mod interceptor;
pub mod middleware;

// Re-exports
pub use config::{CorrelationConfig, CorrelationPolicy, LoggingConfig, ServiceConfig};
pub use context::CallContext;
pub use error::{CorrelationError, Result};
pub use events::BusinessEvent;
pub use extractor::{CorrelationExtractor, IdGenerator, UuidGenerator, record_from_metadata};
pub use fields::{LogFieldComposer, LogFields, OtelTraceProvider, TraceProvider};
pub use injector::CorrelationInjector;
pub use logging::{
    RequestLogger, default_logger, init_logging, logger_for, logger_for_context,
};
pub use metadata::{REQUEST_ID_HEADER, SESSION_ID_HEADER, USER_ID_HEADER};
pub use record::{CorrelationField, CorrelationRecord};

pub use interceptor::{
    CorrelationClientInterceptor, CorrelationServerInterceptor, call_context, with_inbound,
    with_outbound,
};
pub use middleware::{CorrelationLayer, CorrelationService};
