// ==========================================
// 赛车零件追踪系统 - 里程记录仓储
// ==========================================
// 事务: 追加记录 + 在用零件里程累加 同一事务
// ==========================================

use crate::domain::mileage::{MileageLogEntry, MileageLogQuery};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct MileageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MileageRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加里程记录并累加到车辆全部在用零件
    ///
    /// # 返回
    /// - Ok(usize): 被更新的在用零件数
    pub fn append_and_apply(&self, entry: &MileageLogEntry) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO mileage_log (log_id, car_id, miles, note, test_date, logged_by, logged_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.log_id,
                entry.car_id,
                entry.miles,
                entry.note,
                entry.test_date,
                entry.logged_by,
                entry.logged_at,
            ],
        )?;

        let updated = tx.execute(
            r#"
            UPDATE part SET miles_used = miles_used + ?2, updated_at = ?3
            WHERE car_id = ?1 AND active = 1
            "#,
            params![entry.car_id, entry.miles, entry.logged_at],
        )?;

        tx.commit()?;
        Ok(updated)
    }

    /// 查询车辆里程记录（按测试日期、记录时间倒序）
    pub fn list(
        &self,
        car_id: &str,
        query: &MileageLogQuery,
    ) -> RepositoryResult<Vec<MileageLogEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT log_id, car_id, miles, note, test_date, logged_by, logged_at
            FROM mileage_log
            WHERE car_id = ?1
              AND (?2 IS NULL OR test_date >= ?2)
              AND (?3 IS NULL OR test_date <= ?3)
            ORDER BY test_date DESC, logged_at DESC
            LIMIT ?4
            "#,
        )?;
        let entries = stmt
            .query_map(
                params![car_id, query.from_date, query.to_date, query.limit as i64],
                |row| {
                    Ok(MileageLogEntry {
                        log_id: row.get(0)?,
                        car_id: row.get(1)?,
                        miles: row.get(2)?,
                        note: row.get(3)?,
                        test_date: row.get(4)?,
                        logged_by: row.get(5)?,
                        logged_at: row.get(6)?,
                    })
                },
            )?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }
}
