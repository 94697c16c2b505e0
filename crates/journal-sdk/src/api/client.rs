//! HTTP API 客户端
//!
//! 使用 reqwest 作为底层 HTTP 客户端；`ApiClient` 只暴露原始 JSON，
//! 信封解析由 [`ApiClientExt`] 负责，便于替换传输层。

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

use crate::api::envelope::Envelope;
use crate::config::HttpClientConfig;
use crate::error::{JournalSDKError, Result};

/// 已认证的 API 客户端
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// GET `{base_url}/{path}`，返回原始 JSON
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<serde_json::Value>;
}

/// 信封解码扩展
#[async_trait]
pub trait ApiClientExt {
    /// GET 并解码 `Envelope<T>`，状态码非 0 时返回 `JournalSDKError::Api`
    async fn get_envelope<T>(&self, path: &str, query: &[(String, String)]) -> Result<T>
    where
        T: DeserializeOwned + Send;
}

#[async_trait]
impl<C: ApiClient + ?Sized> ApiClientExt for C {
    async fn get_envelope<T>(&self, path: &str, query: &[(String, String)]) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.get_json(path, query).await?;
        let envelope: Envelope<T> = serde_json::from_value(value)
            .map_err(|e| JournalSDKError::Serialization(format!("解析响应信封失败 ({}): {}", path, e)))?;
        envelope.into_result()
    }
}

/// 构建共享的 reqwest Client（连接池在所有 HttpApiClient 间复用）
pub fn build_http_client(config: &HttpClientConfig) -> Result<Client> {
    let mut builder = Client::builder();

    if let Some(timeout) = config.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(timeout));
    }

    if let Some(timeout) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(timeout));
    }

    if let Some(ua) = &config.user_agent {
        builder = builder.user_agent(ua.clone());
    }

    builder
        .build()
        .map_err(|e| JournalSDKError::Other(format!("创建 HTTP 客户端失败: {}", e)))
}

/// 基于 reqwest 的 API 客户端，绑定一个 base_url 与一个访问令牌
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl HttpApiClient {
    pub fn new(client: Client, base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<serde_json::Value> {
        let url = self.url_for(path);
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!("➡️ GET {} (request_id={})", url, request_id);

        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(&self.access_token)
            .header("X-Request-Id", request_id.as_str())
            .send()
            .await
            .map_err(|e| JournalSDKError::Transport(format!("请求失败 {}: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(JournalSDKError::Auth(format!("服务端拒绝访问 {}: {}", url, status)));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "无法读取错误信息".to_string());
            error!("❌ GET {} 失败，HTTP 状态码: {}, 错误: {}", url, status, error_text);
            return Err(JournalSDKError::Transport(format!(
                "HTTP 状态码: {} ({})", status, error_text
            )));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| JournalSDKError::Serialization(format!("解析响应失败 {}: {}", url, e)))
    }
}
