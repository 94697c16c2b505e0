//! Journal SDK - 电子学生手册客户端 SDK
//!
//! 本 SDK 负责本地账号数据与服务端的同步：
//! - 🗄️ 本地存储：SQLite（refinery 迁移）+ sled KV
//! - 🔐 凭据缓存：按登录保存访问令牌
//! - 🔄 账号同步：按有效期判断是否同步，按登录合并拉取，学期变化检测
//! - 👤 会话状态：当前活跃账号随同步结果更新
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use journal_sdk::{JournalConfig, JournalSDK};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = JournalConfig::builder()
//!         .data_dir("/path/to/data")
//!         .build();
//!
//!     let sdk = JournalSDK::initialize(config).await?;
//!     sdk.set_active_account(1).await?;
//!
//!     // 每天最多同步一次
//!     let report = sdk.sync_accounts_if_required().await?;
//!     println!("更新了 {} 个账号", report.updated);
//!
//!     sdk.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod sdk;
pub mod session;
pub mod storage;
pub mod sync;
pub mod version;

pub use api::{AccessToken, ApiClient, ApiClientExt, ApiClientFactory, CredentialStore, HttpApiClientFactory};
pub use config::{HttpClientConfig, JournalConfig, JournalConfigBuilder, SyncConfig};
pub use error::{JournalSDKError, Result};
pub use sdk::JournalSDK;
pub use session::ActiveAccountSlot;
pub use storage::entities::{Account, Login, Period, Pupil, Unit};
pub use storage::{AccountRepository, StorageManager};
pub use sync::{AccountSyncReport, AccountSyncService, StalenessGate, SyncStateStore, ACCOUNTS_SYNC_KEY};
pub use version::{BUILD_TIME, SDK_DB_VERSION, SDK_VERSION};
