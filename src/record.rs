//! 关联记录
//!
//! 一次入站调用对应的 (request_id, session_id, user_id) 三元组。
//! 缺失字段统一用空字符串表示，不区分 null 与缺失。

use serde::{Deserialize, Serialize};

use crate::config::CorrelationPolicy;
use crate::metadata::{REQUEST_ID_HEADER, SESSION_ID_HEADER, USER_ID_HEADER};

/// 关联字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrelationField {
    RequestId,
    SessionId,
    UserId,
}

impl CorrelationField {
    pub const ALL: [CorrelationField; 3] = [
        CorrelationField::RequestId,
        CorrelationField::SessionId,
        CorrelationField::UserId,
    ];

    /// 线上元数据键
    pub fn header(self) -> &'static str {
        match self {
            CorrelationField::RequestId => REQUEST_ID_HEADER,
            CorrelationField::SessionId => SESSION_ID_HEADER,
            CorrelationField::UserId => USER_ID_HEADER,
        }
    }

    /// 日志字段名
    pub fn log_key(self) -> &'static str {
        match self {
            CorrelationField::RequestId => "request_id",
            CorrelationField::SessionId => "session_id",
            CorrelationField::UserId => "user_id",
        }
    }
}

/// 关联记录
///
/// 构造后不可变：`with_*` 方法返回新值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationRecord {
    request_id: String,
    session_id: String,
    user_id: String,
}

impl CorrelationRecord {
    pub fn new(
        request_id: impl Into<String>,
        session_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            session_id: session_id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn get(&self, field: CorrelationField) -> &str {
        match field {
            CorrelationField::RequestId => &self.request_id,
            CorrelationField::SessionId => &self.session_id,
            CorrelationField::UserId => &self.user_id,
        }
    }

    pub fn has_request_id(&self) -> bool {
        !self.request_id.is_empty()
    }

    /// 三个字段是否全部为空
    pub fn is_empty(&self) -> bool {
        self.request_id.is_empty() && self.session_id.is_empty() && self.user_id.is_empty()
    }

    /// 按固定顺序列出所有字段（包括空字段）
    pub fn entries(&self) -> [(CorrelationField, &str); 3] {
        CorrelationField::ALL.map(|field| (field, self.get(field)))
    }

    /// 按策略计算生效的记录
    pub fn effective(&self, policy: &CorrelationPolicy) -> CorrelationRecord {
        let mut record = self.clone();
        if policy.user_id_fallback_to_session_id && record.user_id.is_empty() {
            record.user_id = record.session_id.clone();
        }
        record
    }
}
