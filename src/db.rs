// ==========================================
// 赛车零件追踪系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 启动时幂等建表并登记 schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接、应用统一配置并确保 schema 存在
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 幂等建表
///
/// 表:
/// - config_kv: 全局配置（key-value）
/// - part: 零件（含已退役零件）
/// - part_history: 更换记录（只追加）
/// - mileage_log: 里程记录（只追加）
/// - part_field: 自定义字段定义
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS part (
            part_id TEXT PRIMARY KEY,
            car_id TEXT NOT NULL,
            part_number TEXT NOT NULL,
            part_name TEXT NOT NULL,
            part_group TEXT NOT NULL,
            part_location TEXT NOT NULL,
            miles_used REAL NOT NULL DEFAULT 0 CHECK (miles_used >= 0),
            active INTEGER NOT NULL DEFAULT 1,
            purchased_from TEXT,
            cost TEXT,
            extra_fields_json TEXT NOT NULL DEFAULT '{}',
            replaced_from_history_id TEXT,
            retired_at TEXT,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS ux_part_active_number
            ON part(car_id, part_number) WHERE active = 1;
        CREATE INDEX IF NOT EXISTS ix_part_car_active ON part(car_id, active);

        CREATE TABLE IF NOT EXISTS part_history (
            history_id TEXT PRIMARY KEY,
            car_id TEXT NOT NULL,
            part_id TEXT NOT NULL,
            part_number TEXT NOT NULL,
            part_name TEXT NOT NULL,
            part_group TEXT NOT NULL,
            part_location TEXT NOT NULL,
            miles_at_retirement REAL NOT NULL,
            reason TEXT NOT NULL,
            note TEXT,
            replaced_by TEXT NOT NULL,
            replaced_at TEXT NOT NULL,
            extra_fields_json TEXT NOT NULL DEFAULT '{}',
            new_part_id TEXT
        );

        CREATE INDEX IF NOT EXISTS ix_part_history_car ON part_history(car_id, replaced_at);

        CREATE TABLE IF NOT EXISTS mileage_log (
            log_id TEXT PRIMARY KEY,
            car_id TEXT NOT NULL,
            miles REAL NOT NULL CHECK (miles > 0),
            note TEXT,
            test_date TEXT NOT NULL,
            logged_by TEXT NOT NULL,
            logged_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS ix_mileage_log_car ON mileage_log(car_id, test_date);

        CREATE TABLE IF NOT EXISTS part_field (
            field_id TEXT PRIMARY KEY,
            field_name TEXT NOT NULL UNIQUE,
            label TEXT NOT NULL,
            field_type TEXT NOT NULL,
            options_json TEXT NOT NULL DEFAULT '[]',
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
