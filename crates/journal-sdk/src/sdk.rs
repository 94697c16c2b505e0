//! Journal SDK 入口
//!
//! 分层初始化顺序：
//! 1. 存储层（SQLite + KV）→ 2. 凭据与 API 工厂 → 3. 同步服务 → 4. 会话状态

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::factory::{ApiClientFactory, CredentialStore, HttpApiClientFactory};
use crate::config::JournalConfig;
use crate::error::{JournalSDKError, Result};
use crate::session::ActiveAccountSlot;
use crate::storage::entities::Account;
use crate::storage::StorageManager;
use crate::sync::account_sync::{AccountSyncReport, AccountSyncService};
use crate::sync::gate::StalenessGate;
use crate::sync::resource_store::{ResourceSyncStore, ACCOUNTS_SYNC_KEY};

pub struct JournalSDK {
    config: JournalConfig,
    storage: Arc<StorageManager>,
    credentials: CredentialStore,
    resource_sync: Arc<ResourceSyncStore>,
    account_sync: AccountSyncService,
    active_account: ActiveAccountSlot,
    initialized: Arc<RwLock<bool>>,
}

impl JournalSDK {
    /// 使用 reqwest 实现的 API 工厂初始化
    pub async fn initialize(config: JournalConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let storage = Arc::new(StorageManager::new(&config.data_dir).await?);
        let credentials = CredentialStore::new(storage.kv_store());
        let api_factory = Arc::new(HttpApiClientFactory::new(
            &config.http_client_config,
            credentials.clone(),
        )?);
        Self::assemble(config, storage, credentials, api_factory)
    }

    /// 使用自定义 API 工厂初始化（替换传输层）
    pub async fn initialize_with_factory(
        config: JournalConfig,
        api_factory: Arc<dyn ApiClientFactory>,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let storage = Arc::new(StorageManager::new(&config.data_dir).await?);
        let credentials = CredentialStore::new(storage.kv_store());
        Self::assemble(config, storage, credentials, api_factory)
    }

    fn assemble(
        config: JournalConfig,
        storage: Arc<StorageManager>,
        credentials: CredentialStore,
        api_factory: Arc<dyn ApiClientFactory>,
    ) -> Result<Arc<Self>> {
        info!("正在初始化 JournalSDK {}...", crate::version::SDK_VERSION);

        let resource_sync = Arc::new(ResourceSyncStore::new(storage.kv_store()));
        let gate = StalenessGate::new(config.sync_config.accounts_lifespan());
        let account_sync = AccountSyncService::new(
            storage.clone(),
            api_factory,
            resource_sync.clone(),
            gate,
        );
        if config.debug_mode {
            debug!("账号同步有效期: {:?}", gate.lifespan());
        }

        info!("✅ JournalSDK 初始化完成: {}", config.data_dir.display());
        Ok(Arc::new(Self {
            config,
            storage,
            credentials,
            resource_sync,
            account_sync,
            active_account: ActiveAccountSlot::new(),
            initialized: Arc::new(RwLock::new(true)),
        }))
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<StorageManager> {
        &self.storage
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub async fn is_initialized(&self) -> bool {
        *self.initialized.read().await
    }

    async fn check_initialized(&self) -> Result<()> {
        if !self.is_initialized().await {
            return Err(JournalSDKError::NotInitialized("SDK 未初始化".to_string()));
        }
        Ok(())
    }

    // ========== 活跃账号 ==========

    pub fn active_account(&self) -> Option<Account> {
        self.active_account.get()
    }

    /// 切换活跃账号（从存储加载）
    pub async fn set_active_account(&self, account_id: i64) -> Result<Account> {
        self.check_initialized().await?;
        let account = self
            .storage
            .get_account(account_id)
            .await?
            .ok_or_else(|| JournalSDKError::NotFound(format!("账号 {} 不存在", account_id)))?;
        self.active_account.set(Some(account.clone()));
        info!("活跃账号切换为 {}", account_id);
        Ok(account)
    }

    pub fn clear_active_account(&self) {
        self.active_account.clear();
    }

    // ========== 账号同步 ==========

    /// 上次同步已过期时同步账号信息
    pub async fn sync_accounts_if_required(&self) -> Result<AccountSyncReport> {
        self.run_account_sync(false).await
    }

    /// 忽略有效期立即同步（手动刷新）
    pub async fn refresh_accounts(&self) -> Result<AccountSyncReport> {
        self.run_account_sync(true).await
    }

    /// 清除同步时间，下次 `sync_accounts_if_required` 必然执行
    pub async fn invalidate_account_sync(&self) -> Result<()> {
        self.check_initialized().await?;
        self.resource_sync.invalidate(ACCOUNTS_SYNC_KEY).await
    }

    async fn run_account_sync(&self, force: bool) -> Result<AccountSyncReport> {
        self.check_initialized().await?;
        let active_id = self.active_account.active_id();

        match self.account_sync.sync_accounts(active_id, force).await {
            Ok(report) => {
                if let Some(account) = report.active_account.clone() {
                    if self.active_account.replace_if_same(account) {
                        debug!("活跃账号已替换为同步后的数据");
                    }
                }
                Ok(report)
            }
            Err(e) => {
                // 失败前可能已有账号落库，活跃账号以存储为准
                if let Some(id) = active_id {
                    self.reload_active_account(id).await;
                }
                Err(e)
            }
        }
    }

    async fn reload_active_account(&self, account_id: i64) {
        match self.storage.get_account(account_id).await {
            Ok(Some(account)) => {
                self.active_account.replace_if_same(account);
            }
            Ok(None) => warn!("活跃账号 {} 已不在存储中", account_id),
            Err(e) => warn!("重新加载活跃账号 {} 失败: {}", account_id, e),
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        info!("正在关闭 JournalSDK...");
        {
            let mut initialized = self.initialized.write().await;
            if !*initialized {
                return Ok(());
            }
            *initialized = false;
        }
        self.storage.shutdown().await?;
        info!("JournalSDK 关闭完成");
        Ok(())
    }
}
