//! 数据库 Actor - 单线程数据库访问模型
//!
//! - SQLite Connection 永远只在一个专用线程中
//! - 所有数据库操作通过 channel 发送命令，结果经 oneshot 返回
//! - 无跨线程使用，无锁竞争

use crossbeam_channel::{unbounded, Receiver, Sender};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{JournalSDKError, Result};
use crate::storage::dao::{DaoFactory, TransactionManager};
use crate::storage::entities::Account;
use crate::storage::migrate;

/// 数据库命令
pub enum DbCommand {
    /// 打开（或创建）数据库并执行迁移
    Open {
        db_path: PathBuf,
        respond_to: oneshot::Sender<Result<()>>,
    },

    /// 批量写入账号（upsert，单事务）
    SaveAccounts {
        accounts: Vec<Account>,
        respond_to: oneshot::Sender<Result<()>>,
    },

    /// 单条更新账号（不存在返回 NotFound）
    UpdateAccount {
        account: Account,
        respond_to: oneshot::Sender<Result<()>>,
    },

    GetAccount {
        id: i64,
        respond_to: oneshot::Sender<Result<Option<Account>>>,
    },

    /// 全部账号（插入顺序）
    ListAccounts {
        respond_to: oneshot::Sender<Result<Vec<Account>>>,
    },

    /// 关闭 Actor
    Shutdown,
}

/// 数据库 Actor（运行在独立线程）
struct DbActor {
    connection: Option<Connection>,
    receiver: Receiver<DbCommand>,
    thread_id: thread::ThreadId,
}

impl DbActor {
    fn new(receiver: Receiver<DbCommand>) -> Self {
        let thread_id = thread::current().id();
        info!("🚀 [Thread {:?}] DbActor 已启动", thread_id);
        Self {
            connection: None,
            receiver,
            thread_id,
        }
    }

    fn conn(&self) -> Result<&Connection> {
        self.connection
            .as_ref()
            .ok_or_else(|| JournalSDKError::NotInitialized("数据库尚未打开".to_string()))
    }

    /// 运行 Actor 主循环
    fn run(mut self) {
        info!("🔄 [Thread {:?}] DbActor 开始处理命令", self.thread_id);

        while let Ok(command) = self.receiver.recv() {
            match command {
                DbCommand::Shutdown => {
                    info!("🛑 [Thread {:?}] DbActor 收到停止信号", self.thread_id);
                    break;
                }
                DbCommand::Open { db_path, respond_to } => {
                    let result = self.handle_open(&db_path);
                    let _ = respond_to.send(result);
                }
                DbCommand::SaveAccounts { accounts, respond_to } => {
                    let result = self.handle_save_accounts(&accounts);
                    let _ = respond_to.send(result);
                }
                DbCommand::UpdateAccount { account, respond_to } => {
                    let result = self
                        .conn()
                        .and_then(|conn| DaoFactory::account_dao(conn).update(&account));
                    let _ = respond_to.send(result);
                }
                DbCommand::GetAccount { id, respond_to } => {
                    let result = self
                        .conn()
                        .and_then(|conn| DaoFactory::account_dao(conn).get_by_id(id));
                    let _ = respond_to.send(result);
                }
                DbCommand::ListAccounts { respond_to } => {
                    let result = self
                        .conn()
                        .and_then(|conn| DaoFactory::account_dao(conn).list_all());
                    let _ = respond_to.send(result);
                }
            }
        }

        info!("✅ [Thread {:?}] DbActor 已退出", self.thread_id);
    }

    fn handle_open(&mut self, db_path: &Path) -> Result<()> {
        if self.connection.is_some() {
            debug!("数据库已打开，忽略重复 Open: {}", db_path.display());
            return Ok(());
        }
        let mut conn = Connection::open(db_path)
            .map_err(|e| JournalSDKError::Database(format!("打开数据库失败: {}", e)))?;
        let state = migrate::init_db(&mut conn)?;
        info!("✅ 数据库已打开: {} (schema: {:?})", db_path.display(), state);
        self.connection = Some(conn);
        Ok(())
    }

    fn handle_save_accounts(&self, accounts: &[Account]) -> Result<()> {
        let conn = self.conn()?;
        TransactionManager::new(conn).execute(|conn| {
            let dao = DaoFactory::account_dao(conn);
            for account in accounts {
                dao.upsert(account)?;
            }
            Ok(())
        })
    }
}

/// DB Actor 句柄（可跨任务克隆）
#[derive(Clone)]
pub struct DbActorHandle {
    sender: Sender<DbCommand>,
}

impl std::fmt::Debug for DbActorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbActorHandle")
            .field("sender", &"<channel>")
            .finish()
    }
}

impl DbActorHandle {
    /// 启动 DB Actor 专用线程
    pub fn spawn() -> Result<Self> {
        let (sender, receiver) = unbounded();

        thread::Builder::new()
            .name("db-actor".to_string())
            .spawn(move || {
                let actor = DbActor::new(receiver);
                actor.run();
            })
            .map_err(|e| JournalSDKError::Other(format!("无法启动 DB Actor 线程: {}", e)))?;

        Ok(Self { sender })
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<Result<T>>) -> DbCommand) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .map_err(|_| JournalSDKError::Other("DB Actor 已停止".to_string()))?;
        rx.await
            .map_err(|_| JournalSDKError::Other("DB Actor 响应失败".to_string()))?
    }

    pub async fn open(&self, db_path: PathBuf) -> Result<()> {
        self.request(|respond_to| DbCommand::Open { db_path, respond_to }).await
    }

    pub async fn save_accounts(&self, accounts: Vec<Account>) -> Result<()> {
        self.request(|respond_to| DbCommand::SaveAccounts { accounts, respond_to }).await
    }

    pub async fn update_account(&self, account: Account) -> Result<()> {
        let id = account.id;
        let result = self
            .request(|respond_to| DbCommand::UpdateAccount { account, respond_to })
            .await;
        if let Err(e) = &result {
            warn!("❌ [DbActorHandle] 更新账号失败: id={}, error={}", id, e);
        }
        result
    }

    pub async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        self.request(|respond_to| DbCommand::GetAccount { id, respond_to }).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.request(|respond_to| DbCommand::ListAccounts { respond_to }).await
    }

    /// 停止 DB Actor
    pub fn shutdown(&self) {
        let _ = self.sender.send(DbCommand::Shutdown);
    }
}
