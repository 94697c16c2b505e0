//! SQLite 初始化：pragma、schema 版本校验、refinery 迁移
//!
//! 打开顺序：pragma → 读取已应用的最高版本 → 高于 `SDK_DB_VERSION` 则拒绝 → 执行迁移。
//! 先校验再迁移，旧版 SDK 不会往新版数据库里写入任何东西。

mod embedded {
    use refinery::embed_migrations;

    embed_migrations!("./migrations");
}

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{JournalSDKError, Result};
use crate::version::SDK_DB_VERSION;

/// 打开数据库时 schema 相对当前 SDK 的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// 新库，尚未执行任何迁移
    Empty,
    /// 旧版本，迁移后即为最新
    Behind { applied: i64 },
    Current,
    /// 由更新版本的 SDK 写入
    Ahead { applied: i64 },
}

impl SchemaState {
    fn from_applied(applied: Option<i64>) -> Self {
        match applied {
            None => SchemaState::Empty,
            Some(v) if v < SDK_DB_VERSION => SchemaState::Behind { applied: v },
            Some(v) if v == SDK_DB_VERSION => SchemaState::Current,
            Some(v) => SchemaState::Ahead { applied: v },
        }
    }
}

fn apply_pragmas(conn: &Connection) -> Result<()> {
    let journal_mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(|e| JournalSDKError::Database(format!("设置 journal_mode 失败: {}", e)))?;
    for (name, value) in [("synchronous", "NORMAL"), ("foreign_keys", "ON"), ("temp_store", "MEMORY")] {
        conn.pragma_update(None, name, value)
            .map_err(|e| JournalSDKError::Database(format!("设置 PRAGMA {} 失败: {}", name, e)))?;
    }
    debug!("SQLite journal_mode={}", journal_mode);
    Ok(())
}

fn history_table_exists(conn: &Connection) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'refinery_schema_history'",
        [],
        |row| row.get(0),
    )
    .map_err(|e| JournalSDKError::Database(format!("查询迁移历史表失败: {}", e)))
}

/// 当前库已应用的最高迁移版本；新库返回 None
pub fn applied_version(conn: &mut Connection) -> Result<Option<i64>> {
    if !history_table_exists(conn)? {
        return Ok(None);
    }
    let last = embedded::migrations::runner()
        .get_last_applied_migration(conn)
        .map_err(|e| JournalSDKError::Database(format!("读取迁移历史失败: {}", e)))?;
    Ok(last.map(|m| i64::from(m.version())))
}

/// 执行嵌入的迁移，返回本次新应用的数量
pub fn run_migrations(conn: &mut Connection) -> Result<usize> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| JournalSDKError::Database(format!("执行 migration 失败: {}", e)))?;
    for migration in report.applied_migrations() {
        info!("📦 已应用迁移 V{}__{}", migration.version(), migration.name());
    }
    Ok(report.applied_migrations().len())
}

/// 打开数据库的统一入口，返回迁移前的 schema 状态
pub fn init_db(conn: &mut Connection) -> Result<SchemaState> {
    apply_pragmas(conn)?;

    let state = SchemaState::from_applied(applied_version(conn)?);
    if let SchemaState::Ahead { applied } = state {
        return Err(JournalSDKError::Database(format!(
            "数据库版本 {} 高于当前 SDK 支持的最高版本 {}，请升级 SDK 后再打开",
            applied, SDK_DB_VERSION
        )));
    }

    run_migrations(conn)?;
    Ok(state)
}
