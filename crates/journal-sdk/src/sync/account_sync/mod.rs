//! 账号同步
//!
//! - grouping: 按登录分组
//! - reconcile: 单账号合并（纯函数）
//! - mapper: 线上学期 → 本地学期
//! - engine: 编排一次完整同步

pub mod engine;
pub mod grouping;
pub mod mapper;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{AccountSyncReport, AccountSyncService};
pub use grouping::{group_by_login, LoginGroup};
pub use reconcile::{reconcile_account, CurrentPeriodViolation, PeriodSide, ReconcileOutcome};
