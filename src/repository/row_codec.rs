// ==========================================
// 赛车零件追踪系统 - 行字段编解码
// ==========================================
// 职责: 枚举列 / JSON 列 与 SQLite TEXT 之间的转换
// ==========================================

use crate::domain::part::ExtraFields;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::Row;

/// 读取枚举列；无法识别的值视为数据损坏
pub fn enum_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("无法识别的枚举值: {}", raw).into(),
        )
    })
}

/// 读取 JSON 列
pub fn json_column<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 序列化扩展字段
pub fn encode_extra_fields(extra: &ExtraFields) -> RepositoryResult<String> {
    serde_json::to_string(extra).map_err(|e| RepositoryError::SerializationError {
        field: "extra_fields".to_string(),
        message: e.to_string(),
    })
}
