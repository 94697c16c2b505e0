//! 存储模块 - SDK 的数据持久化层
//!
//! - StorageManager: 统一的存储管理器，提供领域 API
//! - DAO Layer: 数据访问层，每张表一个专门的操作模块
//! - Entities: 数据实体定义
//! - KvStore: sled 键值存储（同步时间戳、凭据缓存）

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::error::{JournalSDKError, Result};

pub mod dao;
pub mod db_actor;
pub mod entities;
pub mod kv;
pub mod migrate;

pub use entities::*;
pub use kv::KvStore;

/// 数据库文件名
const DB_FILE_NAME: &str = "journal.db";

/// 本地账号仓储 - 同步流程只依赖这两个操作
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// 全部本地账号（插入顺序）
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// 单条更新
    async fn update_account(&self, account: &Account) -> Result<()>;
}

/// 存储管理器 - 统一的数据访问接口
///
/// 外部无法直接访问 SQLite；所有读写经由 DB Actor 串行执行。
#[derive(Debug)]
pub struct StorageManager {
    db_actor: db_actor::DbActorHandle,
    kv_store: Arc<KvStore>,
}

impl StorageManager {
    /// 创建新的存储管理器：建目录 → 启动 DB Actor 并迁移 → 打开 KV
    pub async fn new(base_path: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(base_path)
            .await
            .map_err(|e| JournalSDKError::IO(format!("创建存储目录失败: {}", e)))?;

        let db_actor = db_actor::DbActorHandle::spawn()?;
        let db_path = base_path.join(DB_FILE_NAME);
        tracing::info!("🔧 正在初始化数据库: path={}", db_path.display());
        db_actor.open(db_path).await?;

        let kv_store = Arc::new(KvStore::new(base_path).await?);

        tracing::info!("✅ 存储初始化完成: {}", base_path.display());

        Ok(Self {
            db_actor,
            kv_store,
        })
    }

    pub fn kv_store(&self) -> Arc<KvStore> {
        self.kv_store.clone()
    }

    pub async fn save_accounts(&self, accounts: Vec<Account>) -> Result<()> {
        self.db_actor.save_accounts(accounts).await
    }

    pub async fn save_account(&self, account: &Account) -> Result<()> {
        self.db_actor.save_accounts(vec![account.clone()]).await
    }

    pub async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        self.db_actor.get_account(id).await
    }

    pub async fn get_accounts(&self) -> Result<Vec<Account>> {
        self.db_actor.list_accounts().await
    }

    /// 关闭 DB Actor 并刷盘 KV
    pub async fn shutdown(&self) -> Result<()> {
        self.kv_store.flush().await?;
        self.db_actor.shutdown();
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for StorageManager {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.get_accounts().await
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        self.db_actor.update_account(account.clone()).await
    }
}
