//! KV 存储模块 - 基于 sled 的键值存储
//!
//! 用于保存同步时间戳、凭据缓存等轻量状态，值统一以 JSON 编码。

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use sled::{Db, Tree};
use serde::{Serialize, Deserialize};
use crate::error::{JournalSDKError, Result};

const TREE_NAME: &str = "journal";

/// 打开 sled 时的锁等待策略：同目录的旧实例可能还没释放文件锁
#[derive(Debug, Clone, Copy)]
struct OpenRetry {
    attempts: u32,
    base_delay: Duration,
}

impl Default for OpenRetry {
    fn default() -> Self {
        Self {
            attempts: 6,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl OpenRetry {
    /// 第 n 次失败后的等待时间，指数退避
    fn delay_after(&self, failed_attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(failed_attempt)
    }
}

fn is_lock_contention(error: &sled::Error) -> bool {
    match error {
        sled::Error::Io(io) => {
            io.kind() == std::io::ErrorKind::WouldBlock
                || io.to_string().contains("could not acquire lock")
        }
        _ => false,
    }
}

async fn open_with_retry(path: &Path, retry: OpenRetry) -> Result<Db> {
    let mut attempt = 0;
    loop {
        match sled::open(path) {
            Ok(db) => return Ok(db),
            Err(e) if is_lock_contention(&e) && attempt + 1 < retry.attempts => {
                let delay = retry.delay_after(attempt);
                tracing::warn!("KV 文件锁被占用，{:?} 后重试 ({}/{})", delay, attempt + 1, retry.attempts);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(JournalSDKError::KvStore(format!("打开 sled 数据库失败: {}", e)));
            }
        }
    }
}

/// KV 存储组件
#[derive(Debug)]
pub struct KvStore {
    db: Arc<Db>,
    tree: Tree,
}

impl KvStore {
    /// 创建新的 KV 存储实例
    pub async fn new(base_path: &Path) -> Result<Self> {
        let kv_path = base_path.join("kv");

        tokio::fs::create_dir_all(&kv_path).await
            .map_err(|e| JournalSDKError::IO(format!("创建 KV 存储目录失败: {}", e)))?;

        let db = open_with_retry(&kv_path, OpenRetry::default()).await?;

        let tree = db.open_tree(TREE_NAME)
            .map_err(|e| JournalSDKError::KvStore(format!("打开 Tree 失败: {}", e)))?;

        tracing::info!("KV 存储初始化完成: {}", kv_path.display());

        Ok(Self {
            db: Arc::new(db),
            tree,
        })
    }

    /// 设置键值对
    pub async fn set<K, V>(&self, key: K, value: &V) -> Result<()>
    where
        K: AsRef<[u8]>,
        V: Serialize,
    {
        let value_bytes = serde_json::to_vec(value)
            .map_err(|e| JournalSDKError::Serialization(format!("序列化值失败: {}", e)))?;

        self.tree.insert(key, value_bytes)
            .map_err(|e| JournalSDKError::KvStore(format!("设置键值对失败: {}", e)))?;

        Ok(())
    }

    /// 获取键值对
    pub async fn get<K, V>(&self, key: K) -> Result<Option<V>>
    where
        K: AsRef<[u8]>,
        V: for<'de> Deserialize<'de>,
    {
        let result = self.tree.get(key)
            .map_err(|e| JournalSDKError::KvStore(format!("获取键值对失败: {}", e)))?;

        match result {
            Some(value_bytes) => {
                let value = serde_json::from_slice(&value_bytes)
                    .map_err(|e| JournalSDKError::Serialization(format!("反序列化值失败: {}", e)))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// 删除键值对
    pub async fn delete<K>(&self, key: K) -> Result<Option<Vec<u8>>>
    where
        K: AsRef<[u8]>,
    {
        let result = self.tree.remove(key)
            .map_err(|e| JournalSDKError::KvStore(format!("删除键值对失败: {}", e)))?;

        Ok(result.map(|v| v.to_vec()))
    }

    /// 刷盘
    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await
            .map_err(|e| JournalSDKError::KvStore(format!("刷盘失败: {}", e)))?;
        Ok(())
    }
}

/// 常用的键前缀常量
pub mod keys {
    /// 资源同步时间前缀
    pub const RESOURCE_SYNC: &str = "resource_sync";
    /// 令牌缓存前缀
    pub const TOKEN_CACHE: &str = "token_cache_";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use serde_json::json;

    #[tokio::test]
    async fn test_kv_store_basic_operations() {
        let temp_dir = TempDir::new().unwrap();
        let store = KvStore::new(temp_dir.path()).await.unwrap();

        let test_data = json!({
            "name": "test",
            "value": 123
        });

        store.set("test_key", &test_data).await.unwrap();
        let retrieved: serde_json::Value = store.get("test_key").await.unwrap().unwrap();
        assert_eq!(retrieved, test_data);

        let missing: Option<serde_json::Value> = store.get("non_existent_key").await.unwrap();
        assert!(missing.is_none());

        store.delete("test_key").await.unwrap();
        let deleted: Option<serde_json::Value> = store.get("test_key").await.unwrap();
        assert!(deleted.is_none());
    }

    #[test]
    fn open_retry_backs_off_exponentially() {
        let retry = OpenRetry::default();
        assert_eq!(retry.delay_after(0), Duration::from_millis(100));
        assert_eq!(retry.delay_after(3), Duration::from_millis(800));
    }

    #[test]
    fn only_lock_errors_are_retried() {
        let lock = sled::Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "could not acquire lock on \"kv/db\"",
        ));
        assert!(is_lock_contention(&lock));
        assert!(is_lock_contention(&sled::Error::Io(std::io::ErrorKind::WouldBlock.into())));
        assert!(!is_lock_contention(&sled::Error::Unsupported("format".to_string())));
    }

    #[tokio::test]
    async fn test_kv_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = KvStore::new(temp_dir.path()).await.unwrap();
            store.set("persisted", &42u64).await.unwrap();
            store.flush().await.unwrap();
        }
        let store = KvStore::new(temp_dir.path()).await.unwrap();
        let value: Option<u64> = store.get("persisted").await.unwrap();
        assert_eq!(value, Some(42));
    }
}
