use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::debug;

use crate::context::CallContext;
use crate::injector::CorrelationInjector;

/// 出站关联拦截器
///
/// 从请求扩展读取 [`CallContext`]，只把关联记录的非空字段写入请求元数据，
/// 请求上已有的其他键保持不变。请求未携带上下文时原样放行。
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationClientInterceptor {
    injector: CorrelationInjector,
}

impl CorrelationClientInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_injector(injector: CorrelationInjector) -> Self {
        Self { injector }
    }

    pub fn intercept<T>(&self, mut req: Request<T>) -> Result<Request<T>, Status> {
        let Some(ctx) = req.extensions().get::<CallContext>().cloned() else {
            debug!("Outbound request carries no call context, skipping correlation headers");
            return Ok(req);
        };

        if let Some(record) = ctx.correlation() {
            let record = record.effective(self.injector.policy());
            self.injector.apply(&record, req.metadata_mut());
        }
        req.extensions_mut().insert(ctx);
        Ok(req)
    }
}

impl Interceptor for CorrelationClientInterceptor {
    fn call(&mut self, req: Request<()>) -> Result<Request<()>, Status> {
        self.intercept(req)
    }
}
