use std::fmt;
use rusqlite;

#[derive(Debug)]
pub enum JournalSDKError {
    SqliteError(rusqlite::Error),
    JsonError(String),
    InvalidArgument(String),
    NotFound(String),
    Other(String),
    KvStore(String),
    Serialization(String),
    IO(String),
    Database(String),
    Transport(String),  // 传输层错误（连接、超时、HTTP 状态码）
    Auth(String),       // 认证错误（凭据缺失或失效）
    Config(String),
    NotInitialized(String),
    // 服务端在 Envelope.Status 中返回的业务错误
    Api {
        code: i32,
        message: String,
    },
    // 数据契约被破坏（例如 current 学期不唯一），不允许静默修正
    ContractViolation(String),
}

impl fmt::Display for JournalSDKError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalSDKError::SqliteError(e) => write!(f, "SQLite error: {}", e),
            JournalSDKError::JsonError(e) => write!(f, "JSON error: {}", e),
            JournalSDKError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
            JournalSDKError::NotFound(e) => write!(f, "Not found: {}", e),
            JournalSDKError::Other(e) => write!(f, "Other error: {}", e),
            JournalSDKError::KvStore(e) => write!(f, "KV store error: {}", e),
            JournalSDKError::Serialization(e) => write!(f, "Serialization error: {}", e),
            JournalSDKError::IO(e) => write!(f, "IO error: {}", e),
            JournalSDKError::Database(e) => write!(f, "Database error: {}", e),
            JournalSDKError::Transport(e) => write!(f, "Transport error: {}", e),
            JournalSDKError::Auth(e) => write!(f, "Authentication error: {}", e),
            JournalSDKError::Config(e) => write!(f, "Config error: {}", e),
            JournalSDKError::NotInitialized(e) => write!(f, "Not initialized: {}", e),
            JournalSDKError::Api { code, message } => {
                write!(f, "API error [{}]: {}", code, message)
            }
            JournalSDKError::ContractViolation(e) => write!(f, "Contract violation: {}", e),
        }
    }
}

impl std::error::Error for JournalSDKError {}

impl From<rusqlite::Error> for JournalSDKError {
    fn from(error: rusqlite::Error) -> Self {
        JournalSDKError::SqliteError(error)
    }
}

impl From<serde_json::Error> for JournalSDKError {
    fn from(error: serde_json::Error) -> Self {
        JournalSDKError::JsonError(error.to_string())
    }
}

impl From<std::io::Error> for JournalSDKError {
    fn from(error: std::io::Error) -> Self {
        JournalSDKError::IO(error.to_string())
    }
}

impl JournalSDKError {
    /// 是否为服务端业务错误
    pub fn is_api_error(&self) -> bool {
        matches!(self, JournalSDKError::Api { .. })
    }

    /// 是否为数据契约错误（需要人工介入，重试无意义）
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, JournalSDKError::ContractViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, JournalSDKError>;
