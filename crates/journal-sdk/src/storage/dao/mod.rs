//! 数据访问层 (DAO) - 每张表一个专门的操作模块

pub mod account;

pub use account::AccountDao;

use rusqlite::Connection;
use crate::error::{JournalSDKError, Result};

/// DAO 工厂 - 统一创建各种 DAO 实例
pub struct DaoFactory;

impl DaoFactory {
    /// 创建账号 DAO
    pub fn account_dao(conn: &Connection) -> AccountDao<'_> {
        AccountDao::new(conn)
    }
}

/// 事务管理器
pub struct TransactionManager<'a> {
    conn: &'a Connection,
}

impl<'a> TransactionManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// 执行事务操作；闭包返回错误时事务随 drop 回滚
    pub fn execute<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R>,
    {
        let tx = self.conn.unchecked_transaction()
            .map_err(|e| JournalSDKError::Database(format!("开始事务失败: {}", e)))?;

        let result = f(self.conn)?;

        tx.commit()
            .map_err(|e| JournalSDKError::Database(format!("提交事务失败: {}", e)))?;

        Ok(result)
    }
}
