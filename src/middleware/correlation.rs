use std::task::{Context, Poll};

use tonic::metadata::MetadataMap;
use tower::{Layer, Service};
use tracing::instrument::Instrumented;

use crate::context::CallContext;
use crate::extractor::CorrelationExtractor;
use crate::fields::LogFieldComposer;
use crate::logging::logger_for_context;

/// 关联中间件层
///
/// 对每个 HTTP/gRPC 请求提取关联字段，把 [`CallContext`] 写入请求扩展，
/// 并在带有关联字段的日志 span 内执行内层服务。
#[derive(Debug, Clone, Default)]
pub struct CorrelationLayer {
    extractor: CorrelationExtractor,
    composer: LogFieldComposer,
}

impl CorrelationLayer {
    pub fn new(extractor: CorrelationExtractor, composer: LogFieldComposer) -> Self {
        Self {
            extractor,
            composer,
        }
    }
}

impl<S> Layer<S> for CorrelationLayer {
    type Service = CorrelationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationService {
            inner,
            extractor: self.extractor.clone(),
            composer: self.composer.clone(),
        }
    }
}

/// 关联中间件服务
#[derive(Debug, Clone)]
pub struct CorrelationService<S> {
    inner: S,
    extractor: CorrelationExtractor,
    composer: LogFieldComposer,
}

impl<S, B> Service<http::Request<B>> for CorrelationService<S>
where
    S: Service<http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Instrumented<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<B>) -> Self::Future {
        let parent = req
            .extensions()
            .get::<CallContext>()
            .cloned()
            .unwrap_or_else(CallContext::current);
        let metadata = MetadataMap::from_headers(req.headers().clone());
        let ctx = self.extractor.extract(&parent, &metadata);

        let logger = logger_for_context(&self.composer, &ctx);
        req.extensions_mut().insert(ctx);
        logger.instrument(self.inner.call(req))
    }
}
