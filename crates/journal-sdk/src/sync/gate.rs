//! 资源过期判断
//!
//! 只读：给定上次同步时间与有效期，决定这次是否需要同步。

use chrono::{DateTime, Utc};
use std::time::Duration;

/// 账号同步默认有效期：1 天
pub const DEFAULT_ACCOUNTS_LIFESPAN: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessGate {
    lifespan: Duration,
}

impl StalenessGate {
    pub fn new(lifespan: Duration) -> Self {
        Self { lifespan }
    }

    pub fn lifespan(&self) -> Duration {
        self.lifespan
    }

    /// 从未同步、或距上次同步已满有效期时返回 true。
    /// 上次同步时间晚于 now（时钟回拨）视为仍在有效期内。
    pub fn should_sync(&self, last_synced: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(last) = last_synced else {
            return true;
        };
        match (now - last).to_std() {
            Ok(elapsed) => elapsed >= self.lifespan,
            Err(_) => false,
        }
    }
}

impl Default for StalenessGate {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNTS_LIFESPAN)
    }
}
