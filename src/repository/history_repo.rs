// ==========================================
// 赛车零件追踪系统 - 更换记录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 事务: 退役 + 写历史 + 接替零件 三步同一事务
// ==========================================

use crate::domain::history::{HistoryQuery, ReplacementRecord};
use crate::domain::part::Part;
use crate::domain::types::{PartGroup, PartLocation, ReplacementReason};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::part_repo::insert_part;
use crate::repository::row_codec::{encode_extra_fields, enum_column, json_column};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const HISTORY_COLUMNS: &str = r#"
    history_id, car_id, part_id, part_number, part_name, part_group, part_location,
    miles_at_retirement, reason, note, replaced_by, replaced_at, extra_fields_json, new_part_id
"#;

fn map_history_row(row: &Row<'_>) -> SqliteResult<ReplacementRecord> {
    Ok(ReplacementRecord {
        history_id: row.get(0)?,
        car_id: row.get(1)?,
        part_id: row.get(2)?,
        part_number: row.get(3)?,
        part_name: row.get(4)?,
        part_group: enum_column(row, 5, PartGroup::parse)?,
        part_location: enum_column(row, 6, PartLocation::parse)?,
        miles_at_retirement: row.get(7)?,
        reason: enum_column(row, 8, ReplacementReason::parse)?,
        note: row.get(9)?,
        replaced_by: row.get(10)?,
        replaced_at: row.get(11)?,
        extra_fields: json_column(row, 12)?,
        new_part_id: row.get(13)?,
    })
}

// ==========================================
// HistoryRepository - 更换记录仓储
// ==========================================
pub struct HistoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HistoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 原子地完成一次更换
    ///
    /// # 参数
    /// - record: 退役快照（part_id 指向被退役零件）
    /// - successor: 接替零件（可选）
    ///
    /// # 说明
    /// 1. 退役零件（active=0）；若零件已非在用则整体失败
    /// 2. 写入更换记录
    /// 3. 写入接替零件
    /// 任一步失败整体回滚
    pub fn record_replacement(
        &self,
        record: &ReplacementRecord,
        successor: Option<&Part>,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let retired = tx.execute(
            r#"
            UPDATE part SET active = 0, retired_at = ?2, updated_at = ?2
            WHERE part_id = ?1 AND active = 1
            "#,
            params![record.part_id, record.replaced_at],
        )?;
        if retired != 1 {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "零件非在用状态，无法退役: part_id={}",
                record.part_id
            )));
        }

        let extra_json = encode_extra_fields(&record.extra_fields)?;
        tx.execute(
            r#"
            INSERT INTO part_history (
                history_id, car_id, part_id, part_number, part_name, part_group, part_location,
                miles_at_retirement, reason, note, replaced_by, replaced_at, extra_fields_json,
                new_part_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                record.history_id,
                record.car_id,
                record.part_id,
                record.part_number,
                record.part_name,
                record.part_group.as_str(),
                record.part_location.as_str(),
                record.miles_at_retirement,
                record.reason.as_str(),
                record.note,
                record.replaced_by,
                record.replaced_at,
                extra_json,
                record.new_part_id,
            ],
        )?;

        if let Some(next) = successor {
            insert_part(&tx, next)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 车辆更换历史（新 → 旧）
    pub fn list_by_car(
        &self,
        car_id: &str,
        query: &HistoryQuery,
    ) -> RepositoryResult<Vec<ReplacementRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM part_history
            WHERE car_id = ?1
              AND (?2 IS NULL OR part_number = ?2)
              AND (?3 IS NULL OR reason = ?3)
            ORDER BY replaced_at DESC
            LIMIT ?4
            "#,
            HISTORY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                params![
                    car_id,
                    query.part_number,
                    query.reason.map(|r| r.as_str()),
                    query.limit as i64
                ],
                map_history_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 车辆全部失效记录（旧 → 新），供 MBF 统计
    pub fn list_failures(&self, car_id: &str) -> RepositoryResult<Vec<ReplacementRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM part_history
            WHERE car_id = ?1 AND reason = ?2
            ORDER BY replaced_at ASC
            "#,
            HISTORY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                params![car_id, ReplacementReason::Failure.as_str()],
                map_history_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }
}
