//! 按登录分组
//!
//! 只保留有登录、且至少有一个学期的账号；分组与组内顺序都跟随输入顺序，
//! 下游「取第一个匹配」的语义依赖这一点，所以不用 HashMap 迭代。

use crate::storage::entities::Account;

/// 共享同一登录的一组账号（非空）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGroup {
    pub login_id: i64,
    pub accounts: Vec<Account>,
}

impl LoginGroup {
    /// 组内任意一个账号都可以代表整组做认证，取第一个
    pub fn representative(&self) -> &Account {
        &self.accounts[0]
    }
}

pub fn group_by_login(accounts: Vec<Account>) -> Vec<LoginGroup> {
    let mut groups: Vec<LoginGroup> = Vec::new();

    for account in accounts.into_iter().filter(Account::is_sync_eligible) {
        let Some(login_id) = account.login_id() else {
            continue;
        };
        match groups.iter_mut().find(|g| g.login_id == login_id) {
            Some(group) => group.accounts.push(account),
            None => groups.push(LoginGroup {
                login_id,
                accounts: vec![account],
            }),
        }
    }

    groups
}
