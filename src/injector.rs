//! 出站关联注入
//!
//! 读取上下文中的关联记录，写入出站元数据。只设置非空字段，
//! 不删除也不改动无关的键。真正的调用由传输层完成。

use tonic::Request;
use tonic::metadata::MetadataMap;
use tracing::warn;

use crate::config::CorrelationPolicy;
use crate::context::CallContext;
use crate::metadata::{merge_metadata, set_value};
use crate::record::CorrelationRecord;

/// 关联注入器
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationInjector {
    policy: CorrelationPolicy,
}

impl CorrelationInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CorrelationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CorrelationPolicy {
        &self.policy
    }

    /// 返回出站元数据已写入关联头的子上下文
    pub fn inject(&self, ctx: &CallContext) -> CallContext {
        let mut metadata = ctx.outgoing_metadata().cloned().unwrap_or_default();
        if let Some(record) = ctx.correlation() {
            self.apply(&record.effective(&self.policy), &mut metadata);
        }
        ctx.with_outgoing_metadata(metadata)
    }

    /// 将记录中的非空字段写入元数据（覆盖同名键）
    pub fn apply(&self, record: &CorrelationRecord, metadata: &mut MetadataMap) {
        for (field, value) in record.entries() {
            if value.is_empty() {
                continue;
            }
            if !set_value(metadata, field.header(), value) {
                warn!(
                    header = field.header(),
                    "Skipping correlation value that is not valid ASCII metadata"
                );
            }
        }
    }

    /// 注入后的出站元数据
    pub fn outbound_metadata(&self, ctx: &CallContext) -> MetadataMap {
        self.inject(ctx)
            .outgoing_metadata()
            .cloned()
            .unwrap_or_default()
    }

    /// 构造携带关联头的出站请求
    ///
    /// 上下文带有截止时间时，剩余时长作为请求超时传给传输层。
    pub fn into_request<T>(&self, ctx: &CallContext, message: T) -> Request<T> {
        let ctx = self.inject(ctx);
        let mut request = Request::new(message);

        if let Some(metadata) = ctx.outgoing_metadata() {
            merge_metadata(request.metadata_mut(), metadata);
        }
        if let Some(remaining) = ctx.remaining() {
            request.set_timeout(remaining);
        }

        request.extensions_mut().insert(ctx);
        request
    }
}
