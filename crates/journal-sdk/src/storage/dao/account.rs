//! 账号 DAO - account 表

use rusqlite::{Connection, params};
use crate::error::{JournalSDKError, Result};
use crate::storage::entities::{Account, Login, Period, Pupil, Unit};

const SELECT_COLUMNS: &str = "id, login_id, login_name, caretaker_id, pupil_first_name, pupil_last_name, \
     unit_rest_url, unit_symbol, periods, pupil_number, capabilities";

pub struct AccountDao<'a> {
    conn: &'a Connection,
}

impl<'a> AccountDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn upsert(&self, a: &Account) -> Result<()> {
        let sql = r#"
            INSERT INTO account (id, login_id, login_name, caretaker_id, pupil_first_name, pupil_last_name,
                                 unit_rest_url, unit_symbol, periods, pupil_number, capabilities, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                login_id = excluded.login_id,
                login_name = excluded.login_name,
                caretaker_id = excluded.caretaker_id,
                pupil_first_name = excluded.pupil_first_name,
                pupil_last_name = excluded.pupil_last_name,
                unit_rest_url = excluded.unit_rest_url,
                unit_symbol = excluded.unit_symbol,
                periods = excluded.periods,
                pupil_number = excluded.pupil_number,
                capabilities = excluded.capabilities,
                updated_at = excluded.updated_at
        "#;
        let periods = serde_json::to_string(&a.periods)?;
        let capabilities = serde_json::to_string(&a.capabilities)?;
        let now = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            sql,
            params![
                a.id,
                a.login.as_ref().map(|l| l.id),
                a.login.as_ref().map(|l| l.name.as_str()),
                a.caretaker_id,
                a.pupil.first_name,
                a.pupil.last_name,
                a.unit.rest_url,
                a.unit.symbol,
                periods,
                a.pupil_number,
                capabilities,
                now,
            ],
        )?;
        Ok(())
    }

    /// 单条更新；记录不存在时返回 NotFound
    pub fn update(&self, a: &Account) -> Result<()> {
        let sql = r#"
            UPDATE account SET
                login_id = ?2,
                login_name = ?3,
                caretaker_id = ?4,
                pupil_first_name = ?5,
                pupil_last_name = ?6,
                unit_rest_url = ?7,
                unit_symbol = ?8,
                periods = ?9,
                pupil_number = ?10,
                capabilities = ?11,
                updated_at = ?12
            WHERE id = ?1
        "#;
        let periods = serde_json::to_string(&a.periods)?;
        let capabilities = serde_json::to_string(&a.capabilities)?;
        let now = chrono::Utc::now().timestamp_millis();
        let changed = self.conn.execute(
            sql,
            params![
                a.id,
                a.login.as_ref().map(|l| l.id),
                a.login.as_ref().map(|l| l.name.as_str()),
                a.caretaker_id,
                a.pupil.first_name,
                a.pupil.last_name,
                a.unit.rest_url,
                a.unit.symbol,
                periods,
                a.pupil_number,
                capabilities,
                now,
            ],
        )?;
        if changed == 0 {
            return Err(JournalSDKError::NotFound(format!("account id={}", a.id)));
        }
        Ok(())
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM account WHERE id = ?1", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_account(row)?)),
            None => Ok(None),
        }
    }

    /// 按插入顺序返回全部账号；upsert 已存在的账号不改变其位置
    pub fn list_all(&self) -> Result<Vec<Account>> {
        let sql = format!("SELECT {} FROM account ORDER BY seq ASC", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(row_to_account(row)?);
        }
        Ok(out)
    }
}

fn row_to_account(row: &rusqlite::Row) -> Result<Account> {
    let login_id: Option<i64> = row.get(1)?;
    let login_name: Option<String> = row.get(2)?;
    let periods_json: String = row.get(8)?;
    let capabilities_json: String = row.get(10)?;
    let periods: Vec<Period> = serde_json::from_str(&periods_json)
        .map_err(|e| JournalSDKError::Serialization(format!("解析 periods 失败: {}", e)))?;
    let capabilities: Vec<String> = serde_json::from_str(&capabilities_json)
        .map_err(|e| JournalSDKError::Serialization(format!("解析 capabilities 失败: {}", e)))?;
    Ok(Account {
        id: row.get(0)?,
        login: login_id.map(|id| Login {
            id,
            name: login_name.unwrap_or_default(),
        }),
        caretaker_id: row.get(3)?,
        pupil: Pupil {
            first_name: row.get(4)?,
            last_name: row.get(5)?,
        },
        unit: Unit {
            rest_url: row.get(6)?,
            symbol: row.get(7)?,
        },
        periods,
        pupil_number: row.get(9)?,
        capabilities,
    })
}
