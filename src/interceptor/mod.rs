//! gRPC 拦截器模块
//!
//! 入站侧提取关联字段，出站侧注入关联字段；两侧都只调整上下文，
//! 被包装调用的返回值和错误原样传出。

pub mod client;
pub mod server;

pub use client::CorrelationClientInterceptor;
pub use server::CorrelationServerInterceptor;

use std::future::Future;

use tonic::Request;
use tonic::metadata::MetadataMap;

use crate::context::CallContext;
use crate::extractor::CorrelationExtractor;
use crate::injector::CorrelationInjector;

/// 读取请求上挂载的调用上下文，不存在时返回以当前追踪上下文为来源的根上下文
pub fn call_context<T>(req: &Request<T>) -> CallContext {
    req.extensions()
        .get::<CallContext>()
        .cloned()
        .unwrap_or_else(CallContext::current)
}

/// 入站包装：先提取关联字段，再以新上下文执行处理函数
pub async fn with_inbound<F, Fut, R>(
    extractor: &CorrelationExtractor,
    parent: &CallContext,
    metadata: &MetadataMap,
    handler: F,
) -> R
where
    F: FnOnce(CallContext) -> Fut,
    Fut: Future<Output = R>,
{
    let ctx = extractor.extract(parent, metadata);
    handler(ctx).await
}

/// 出站包装：先注入关联字段，再把上下文交给调用链的下一步
pub async fn with_outbound<F, Fut, R>(
    injector: &CorrelationInjector,
    ctx: &CallContext,
    next: F,
) -> R
where
    F: FnOnce(CallContext) -> Fut,
    Fut: Future<Output = R>,
{
    let ctx = injector.inject(ctx);
    next(ctx).await
}
