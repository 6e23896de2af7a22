// ==========================================
// 赛车零件追踪系统 - 自定义字段仓储
// ==========================================

use crate::domain::field::CustomFieldDefinition;
use crate::domain::types::FieldType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{enum_column, json_column};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

fn map_field_row(row: &Row<'_>) -> SqliteResult<CustomFieldDefinition> {
    Ok(CustomFieldDefinition {
        field_id: row.get(0)?,
        field_name: row.get(1)?,
        label: row.get(2)?,
        field_type: enum_column(row, 3, FieldType::parse)?,
        options: json_column(row, 4)?,
        created_by: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub struct FieldRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FieldRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增字段定义；field_name 重复时返回 UniqueConstraintViolation
    pub fn insert(&self, def: &CustomFieldDefinition) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let options_json =
            serde_json::to_string(&def.options).map_err(|e| RepositoryError::SerializationError {
                field: "options".to_string(),
                message: e.to_string(),
            })?;
        conn.execute(
            r#"
            INSERT INTO part_field (
                field_id, field_name, label, field_type, options_json, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                def.field_id,
                def.field_name,
                def.label,
                def.field_type.as_str(),
                options_json,
                def.created_by,
                def.created_at,
            ],
        )?;
        Ok(())
    }

    /// 全部字段定义（按 field_name 排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<CustomFieldDefinition>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT field_id, field_name, label, field_type, options_json, created_by, created_at
            FROM part_field
            ORDER BY field_name ASC
            "#,
        )?;
        let defs = stmt
            .query_map([], map_field_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(defs)
    }

    /// 删除字段定义（已写入零件的值保留，读取时标记为孤立字段）
    pub fn delete(&self, field_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected =
            conn.execute("DELETE FROM part_field WHERE field_id = ?1", params![field_id])?;
        Ok(affected > 0)
    }
}
