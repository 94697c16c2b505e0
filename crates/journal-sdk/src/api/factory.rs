//! 已认证客户端工厂与凭据缓存
//!
//! 同一 Login 下的所有账号共享认证上下文，工厂只需要其中任意一个账号。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::api::client::{build_http_client, ApiClient, HttpApiClient};
use crate::config::HttpClientConfig;
use crate::error::{JournalSDKError, Result};
use crate::storage::entities::Account;
use crate::storage::kv::{keys, KvStore};

/// 按账号获取已认证客户端
#[async_trait]
pub trait ApiClientFactory: Send + Sync {
    async fn get_authenticated(&self, account: &Account) -> Result<Arc<dyn ApiClient>>;
}

/// 访问令牌
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// 凭据缓存：`token_cache_{login_id}` → AccessToken
#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<KvStore>,
}

impl CredentialStore {
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    fn key(login_id: i64) -> String {
        format!("{}{}", keys::TOKEN_CACHE, login_id)
    }

    pub async fn save_token(&self, login_id: i64, token: &AccessToken) -> Result<()> {
        self.kv.set(Self::key(login_id), token).await
    }

    pub async fn get_token(&self, login_id: i64) -> Result<Option<AccessToken>> {
        self.kv.get(Self::key(login_id)).await
    }

    pub async fn remove_token(&self, login_id: i64) -> Result<()> {
        self.kv.delete(Self::key(login_id)).await?;
        Ok(())
    }
}

/// 基于 reqwest 的工厂：base_url 取账号所属单位的 REST 地址
pub struct HttpApiClientFactory {
    http: Client,
    credentials: CredentialStore,
}

impl HttpApiClientFactory {
    pub fn new(config: &HttpClientConfig, credentials: CredentialStore) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config)?,
            credentials,
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }
}

#[async_trait]
impl ApiClientFactory for HttpApiClientFactory {
    async fn get_authenticated(&self, account: &Account) -> Result<Arc<dyn ApiClient>> {
        let login_id = account
            .login_id()
            .ok_or_else(|| JournalSDKError::Auth(format!("账号 {} 未绑定登录", account.id)))?;

        let token = self
            .credentials
            .get_token(login_id)
            .await?
            .ok_or_else(|| JournalSDKError::Auth(format!("登录 {} 无可用凭据", login_id)))?;
        if token.is_expired(Utc::now()) {
            return Err(JournalSDKError::Auth(format!("登录 {} 的凭据已过期", login_id)));
        }
        if account.unit.rest_url.is_empty() {
            return Err(JournalSDKError::InvalidArgument(format!(
                "账号 {} 缺少单位 REST 地址",
                account.id
            )));
        }

        debug!("🔑 为登录 {} 创建已认证客户端 (unit={})", login_id, account.unit.symbol);
        Ok(Arc::new(HttpApiClient::new(
            self.http.clone(),
            account.unit.rest_url.clone(),
            token.token,
        )))
    }
}
