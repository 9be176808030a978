//! 入站关联提取
//!
//! 从入站元数据读取关联字段，缺失的请求ID由 [`IdGenerator`] 生成，
//! 结果挂在由父上下文派生的子上下文上。不会失败，也不记录日志。

use std::fmt;
use std::sync::Arc;

use tonic::metadata::MetadataMap;
use uuid::Uuid;

use crate::context::CallContext;
use crate::metadata::{REQUEST_ID_HEADER, SESSION_ID_HEADER, USER_ID_HEADER, first_value};
use crate::record::CorrelationRecord;

/// 全局唯一ID生成器
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// 基于 UUID v4 的ID生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// 从元数据读取关联记录（不生成请求ID）
pub fn record_from_metadata(metadata: &MetadataMap) -> CorrelationRecord {
    CorrelationRecord::new(
        first_value(metadata, REQUEST_ID_HEADER),
        first_value(metadata, SESSION_ID_HEADER),
        first_value(metadata, USER_ID_HEADER),
    )
}

/// 关联提取器
#[derive(Clone)]
pub struct CorrelationExtractor {
    ids: Arc<dyn IdGenerator>,
}

impl CorrelationExtractor {
    pub fn new() -> Self {
        Self::with_generator(Arc::new(UuidGenerator))
    }

    pub fn with_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// 读取关联字段并派生子上下文
    ///
    /// 元数据缺少请求ID时，优先沿用父上下文中已有的请求ID，否则生成新ID。
    pub fn extract(&self, parent: &CallContext, metadata: &MetadataMap) -> CallContext {
        let mut record = record_from_metadata(metadata);

        if !record.has_request_id() {
            let request_id = parent
                .correlation()
                .filter(|existing| existing.has_request_id())
                .map(|existing| existing.request_id().to_string())
                .unwrap_or_else(|| self.ids.generate());
            record = record.with_request_id(request_id);
        }

        parent.with_correlation(record)
    }
}

impl Default for CorrelationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CorrelationExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationExtractor").finish_non_exhaustive()
    }
}
