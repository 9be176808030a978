//! gRPC 元数据工具函数
//!
//! 键名大小写不敏感（由 `MetadataMap` 统一转为小写），同名多值时取第一个。

use tonic::metadata::{AsciiMetadataValue, MetadataMap};

/// 请求ID头
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// 会话ID头
pub const SESSION_ID_HEADER: &str = "x-session-id";
/// 用户ID头
pub const USER_ID_HEADER: &str = "x-user-id";

/// 读取某个键的第一个值
///
/// 键不存在或值不是可见 ASCII 时返回空字符串。
pub fn first_value(metadata: &MetadataMap, key: &str) -> String {
    metadata
        .get(key)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// 设置单值（覆盖同名的已有值）
///
/// 值无法编码为 ASCII 元数据时不做修改并返回 `false`。
pub fn set_value(metadata: &mut MetadataMap, key: &'static str, value: &str) -> bool {
    match value.parse::<AsciiMetadataValue>() {
        Ok(v) => {
            metadata.insert(key, v);
            true
        }
        Err(_) => false,
    }
}

/// 将 `source` 合并到 `target`
///
/// `source` 中出现的键整体替换 `target` 中的同名键（保留多值），其余键不变。
pub fn merge_metadata(target: &mut MetadataMap, source: &MetadataMap) {
    let source = source.clone().into_headers();
    let mut headers = std::mem::take(target).into_headers();

    for name in source.keys() {
        headers.remove(name);
        for value in source.get_all(name).iter() {
            headers.append(name.clone(), value.clone());
        }
    }

    *target = MetadataMap::from_headers(headers);
}
