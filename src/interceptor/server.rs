use tonic::service::Interceptor;
use tonic::{Request, Status};

use super::call_context;
use crate::extractor::CorrelationExtractor;

/// 入站关联拦截器
///
/// 把提取后的 [`CallContext`](crate::context::CallContext) 写入请求扩展，
/// 服务实现可通过 [`call_context`] 读取。从不拒绝请求。
#[derive(Debug, Clone, Default)]
pub struct CorrelationServerInterceptor {
    extractor: CorrelationExtractor,
}

impl CorrelationServerInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extractor(extractor: CorrelationExtractor) -> Self {
        Self { extractor }
    }

    pub fn intercept<T>(&self, mut req: Request<T>) -> Result<Request<T>, Status> {
        let parent = call_context(&req);
        let ctx = self.extractor.extract(&parent, req.metadata());
        req.extensions_mut().insert(ctx);
        Ok(req)
    }
}

impl Interceptor for CorrelationServerInterceptor {
    fn call(&mut self, req: Request<()>) -> Result<Request<()>, Status> {
        self.intercept(req)
    }
}
