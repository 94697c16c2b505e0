//! 当前活跃账号
//!
//! 会话范围内共享的一个槽位，界面层通过它读取当前选中的账号。
//! 账号同步不直接修改它，而是返回替换值，由 SDK 调用 [`ActiveAccountSlot::replace_if_same`]。

use parking_lot::RwLock;
use std::sync::Arc;

use crate::storage::entities::Account;

#[derive(Debug, Clone, Default)]
pub struct ActiveAccountSlot {
    inner: Arc<RwLock<Option<Account>>>,
}

impl ActiveAccountSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Account> {
        self.inner.read().clone()
    }

    pub fn active_id(&self) -> Option<i64> {
        self.inner.read().as_ref().map(|a| a.id)
    }

    pub fn set(&self, account: Option<Account>) {
        *self.inner.write() = account;
    }

    pub fn clear(&self) {
        self.set(None);
    }

    /// 仅当槽位中的账号 ID 与 `account.id` 相同时替换，返回是否替换。
    /// 检查与写入在同一把写锁内完成，期间切换账号不会被覆盖。
    pub fn replace_if_same(&self, account: Account) -> bool {
        let mut guard = self.inner.write();
        match guard.as_ref() {
            Some(current) if current.id == account.id => {
                *guard = Some(account);
                true
            }
            _ => false,
        }
    }
}
