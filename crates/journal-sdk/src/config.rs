//! SDK 配置 - 数据目录、HTTP 客户端与同步策略

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{JournalSDKError, Result};

/// HTTP 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// 连接超时（秒）
    pub connect_timeout_secs: Option<u64>,
    /// 请求超时（秒）
    pub request_timeout_secs: Option<u64>,
    /// User-Agent
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: Some(15),
            request_timeout_secs: Some(60),
            user_agent: None,
        }
    }
}

/// 同步策略配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 账号同步结果的有效期（秒），超过即视为过期需要重新同步
    pub accounts_lifespan_secs: u64,
}

impl SyncConfig {
    pub fn accounts_lifespan(&self) -> Duration {
        Duration::from_secs(self.accounts_lifespan_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            accounts_lifespan_secs: 24 * 60 * 60,
        }
    }
}

/// Journal SDK 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// 数据存储目录（SQLite 与 KV 均位于其下）
    pub data_dir: PathBuf,
    /// HTTP 客户端配置
    pub http_client_config: HttpClientConfig,
    /// 同步配置
    pub sync_config: SyncConfig,
    /// 调试模式
    pub debug_mode: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            data_dir: get_default_data_dir(),
            http_client_config: HttpClientConfig::default(),
            sync_config: SyncConfig::default(),
            debug_mode: false,
        }
    }
}

/// 获取默认数据目录 ~/.journal/
fn get_default_data_dir() -> PathBuf {
    if let Some(home_dir) = std::env::var("HOME").ok().map(PathBuf::from) {
        home_dir.join(".journal")
    } else if let Some(home_dir) = std::env::var("USERPROFILE").ok().map(PathBuf::from) {
        home_dir.join(".journal")
    } else {
        PathBuf::from("./journal_data")
    }
}

impl JournalConfig {
    pub fn builder() -> JournalConfigBuilder {
        JournalConfigBuilder::new()
    }

    /// 校验配置；`initialize` 时调用
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(JournalSDKError::Config("data_dir 不能为空".to_string()));
        }
        if self.sync_config.accounts_lifespan_secs == 0 {
            return Err(JournalSDKError::Config(
                "accounts_lifespan_secs 必须大于 0".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct JournalConfigBuilder {
    config: JournalConfig,
}

impl JournalConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: JournalConfig::default(),
        }
    }

    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// 设置 HTTP 客户端配置
    pub fn http_client_config(mut self, config: HttpClientConfig) -> Self {
        self.config.http_client_config = config;
        self
    }

    /// 设置账号同步有效期
    pub fn accounts_lifespan(mut self, lifespan: Duration) -> Self {
        self.config.sync_config.accounts_lifespan_secs = lifespan.as_secs();
        self
    }

    pub fn debug_mode(mut self, enabled: bool) -> Self {
        self.config.debug_mode = enabled;
        self
    }

    pub fn build(self) -> JournalConfig {
        self.config
    }
}

impl Default for JournalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
