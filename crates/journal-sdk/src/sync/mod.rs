//! 资源同步模块
//!
//! 职责：
//! - 判断资源是否过期（gate）
//! - 记录每个资源上次成功同步的时间（resource_store）
//! - 账号与学期信息同步（account_sync）

pub mod account_sync;
pub mod gate;
pub mod resource_store;

pub use account_sync::{AccountSyncReport, AccountSyncService};
pub use gate::{StalenessGate, DEFAULT_ACCOUNTS_LIFESPAN};
pub use resource_store::{ResourceSyncStore, SyncStateStore, ACCOUNTS_SYNC_KEY};
