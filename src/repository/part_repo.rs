// ==========================================
// 赛车零件追踪系统 - 零件数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 同车在用 part_number 唯一（ux_part_active_number 部分唯一索引）
// ==========================================

use crate::domain::part::Part;
use crate::domain::types::{PartGroup, PartLocation};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{encode_extra_fields, enum_column, json_column};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const PART_COLUMNS: &str = r#"
    part_id, car_id, part_number, part_name, part_group, part_location,
    miles_used, active, purchased_from, cost, extra_fields_json,
    replaced_from_history_id, retired_at, created_by, created_at, updated_at
"#;

/// 行 → Part
pub(crate) fn map_part_row(row: &Row<'_>) -> SqliteResult<Part> {
    Ok(Part {
        part_id: row.get(0)?,
        car_id: row.get(1)?,
        part_number: row.get(2)?,
        part_name: row.get(3)?,
        part_group: enum_column(row, 4, PartGroup::parse)?,
        part_location: enum_column(row, 5, PartLocation::parse)?,
        miles_used: row.get(6)?,
        active: row.get(7)?,
        purchased_from: row.get(8)?,
        cost: row.get(9)?,
        extra_fields: json_column(row, 10)?,
        replaced_from_history_id: row.get(11)?,
        retired_at: row.get(12)?,
        created_by: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

/// 插入零件（供事务内复用）
pub(crate) fn insert_part(conn: &Connection, part: &Part) -> RepositoryResult<()> {
    let extra_json = encode_extra_fields(&part.extra_fields)?;
    conn.execute(
        r#"
        INSERT INTO part (
            part_id, car_id, part_number, part_name, part_group, part_location,
            miles_used, active, purchased_from, cost, extra_fields_json,
            replaced_from_history_id, retired_at, created_by, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
        params![
            part.part_id,
            part.car_id,
            part.part_number,
            part.part_name,
            part.part_group.as_str(),
            part.part_location.as_str(),
            part.miles_used,
            part.active,
            part.purchased_from,
            part.cost,
            extra_json,
            part.replaced_from_history_id,
            part.retired_at,
            part.created_by,
            part.created_at,
            part.updated_at,
        ],
    )?;
    Ok(())
}

// ==========================================
// PartRepository - 零件仓储
// ==========================================
/// 零件仓储
/// 职责: 管理 part 表的 CRUD 操作
pub struct PartRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PartRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增零件
    pub fn insert(&self, part: &Part) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_part(&conn, part)
    }

    /// 按主键查询（含已退役零件）
    ///
    /// # 返回
    /// - Ok(Some(Part)): 找到
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, part_id: &str) -> RepositoryResult<Option<Part>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM part WHERE part_id = ?1", PART_COLUMNS);
        let result = conn.query_row(&sql, params![part_id], map_part_row);

        match result {
            Ok(part) => Ok(Some(part)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询车辆在用零件（可按分组/位置过滤），按零件名不区分大小写排序
    pub fn list_active(
        &self,
        car_id: &str,
        group: Option<PartGroup>,
        location: Option<PartLocation>,
    ) -> RepositoryResult<Vec<Part>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM part
            WHERE car_id = ?1 AND active = 1
              AND (?2 IS NULL OR part_group = ?2)
              AND (?3 IS NULL OR part_location = ?3)
            ORDER BY lower(part_name) ASC, part_number ASC
            "#,
            PART_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let parts = stmt
            .query_map(
                params![
                    car_id,
                    group.map(|g| g.as_str()),
                    location.map(|l| l.as_str())
                ],
                map_part_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(parts)
    }

    /// 按里程倒序取在用零件
    pub fn list_high_miles(
        &self,
        car_id: &str,
        group: Option<PartGroup>,
        limit: usize,
    ) -> RepositoryResult<Vec<Part>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM part
            WHERE car_id = ?1 AND active = 1
              AND (?2 IS NULL OR part_group = ?2)
            ORDER BY miles_used DESC, part_number ASC
            LIMIT ?3
            "#,
            PART_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let parts = stmt
            .query_map(
                params![car_id, group.map(|g| g.as_str()), limit as i64],
                map_part_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(parts)
    }

    /// 车辆在用零件号集合（导入查重）
    pub fn active_part_numbers(&self, car_id: &str) -> RepositoryResult<HashSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT part_number FROM part WHERE car_id = ?1 AND active = 1")?;
        let numbers = stmt
            .query_map(params![car_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<HashSet<_>>>()?;
        Ok(numbers)
    }

    /// 同车是否存在同号在用零件（可排除自身）
    pub fn active_number_taken(
        &self,
        car_id: &str,
        part_number: &str,
        exclude_part_id: Option<&str>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM part
            WHERE car_id = ?1 AND part_number = ?2 AND active = 1
              AND (?3 IS NULL OR part_id <> ?3)
            "#,
            params![car_id, part_number, exclude_part_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 覆盖更新零件可编辑字段
    pub fn update(&self, part: &Part) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let extra_json = encode_extra_fields(&part.extra_fields)?;
        let affected = conn.execute(
            r#"
            UPDATE part SET
                part_number = ?2, part_name = ?3, part_group = ?4, part_location = ?5,
                miles_used = ?6, purchased_from = ?7, cost = ?8, extra_fields_json = ?9,
                updated_at = ?10
            WHERE part_id = ?1
            "#,
            params![
                part.part_id,
                part.part_number,
                part.part_name,
                part.part_group.as_str(),
                part.part_location.as_str(),
                part.miles_used,
                part.purchased_from,
                part.cost,
                extra_json,
                part.updated_at,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Part".to_string(),
                id: part.part_id.clone(),
            });
        }
        Ok(())
    }

    /// 物理删除零件（仅管理员操作使用）
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 记录不存在
    pub fn delete(&self, part_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM part WHERE part_id = ?1", params![part_id])?;
        Ok(affected > 0)
    }
}
