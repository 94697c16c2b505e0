//! 资源同步时间存储
//!
//! Key 格式：resource_sync:{resource}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::Result;
use crate::storage::kv::{keys, KvStore};

/// 账号同步的资源名
pub const ACCOUNTS_SYNC_KEY: &str = "AccountsSync";

/// 每个资源上次成功同步的时间
#[async_trait]
pub trait SyncStateStore: Send + Sync {
    async fn get_last_synced(&self, resource: &str) -> Result<Option<DateTime<Utc>>>;

    async fn set_last_synced(&self, resource: &str, at: DateTime<Utc>) -> Result<()>;
}

/// 基于 KvStore 的实现
pub struct ResourceSyncStore {
    kv: Arc<KvStore>,
}

impl ResourceSyncStore {
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    fn key(resource: &str) -> String {
        format!("{}:{}", keys::RESOURCE_SYNC, resource)
    }

    /// 清除同步时间，下次调用必然重新同步
    pub async fn invalidate(&self, resource: &str) -> Result<()> {
        self.kv.delete(Self::key(resource)).await?;
        Ok(())
    }
}

#[async_trait]
impl SyncStateStore for ResourceSyncStore {
    async fn get_last_synced(&self, resource: &str) -> Result<Option<DateTime<Utc>>> {
        self.kv.get(Self::key(resource)).await
    }

    async fn set_last_synced(&self, resource: &str, at: DateTime<Utc>) -> Result<()> {
        self.kv.set(Self::key(resource), &at).await
    }
}
