//! 单账号合并：本地账号 + 服务端账号列表 → 更新后的账号
//!
//! 纯函数，不做 IO；持久化与活跃账号替换由 engine 负责。
//!
//! 学期是否变化的判定分两步：
//! 1. 去重后的服务端学期中出现本地没有的 ID → 变化；
//! 2. 否则比较双方唯一的 current 学期 ID，不同 → 变化。
//!
//! 第 2 步要求双方恰好各有一个 current 学期，否则返回 `ContractViolation`。

use std::collections::HashSet;
use std::fmt;

use crate::api::models::{RemoteAccountSnapshot, RemotePeriod};
use crate::error::{JournalSDKError, Result};
use crate::storage::entities::{Account, Period};
use super::mapper::map_period;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSide {
    Local,
    Remote,
}

impl fmt::Display for PeriodSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodSide::Local => f.write_str("本地"),
            PeriodSide::Remote => f.write_str("服务端"),
        }
    }
}

/// current 学期数量不为 1
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurrentPeriodViolation {
    #[error("账号 {account_id}: {side}学期中没有 current 标记")]
    NoneMarked { account_id: i64, side: PeriodSide },

    #[error("账号 {account_id}: {side}学期中有 {count} 个 current 标记")]
    MultipleMarked {
        account_id: i64,
        side: PeriodSide,
        count: usize,
    },
}

impl From<CurrentPeriodViolation> for JournalSDKError {
    fn from(error: CurrentPeriodViolation) -> Self {
        JournalSDKError::ContractViolation(error.to_string())
    }
}

/// 合并结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// 服务端没有对应账号（或对应账号没有学期），原样返回，不需要持久化
    Unmatched(Account),
    /// 已合并，需要持久化
    Updated {
        account: Account,
        periods_replaced: bool,
    },
}

impl ReconcileOutcome {
    pub fn account(&self) -> &Account {
        match self {
            ReconcileOutcome::Unmatched(account) => account,
            ReconcileOutcome::Updated { account, .. } => account,
        }
    }
}

/// 按服务端返回顺序取第一个匹配项：登录相同，且本地 caretaker 为空或与之相同。
/// 本地 caretaker 为空时匹配任意 caretaker（首次同步前本地还不知道 caretaker）。
pub fn find_remote_match<'a>(
    account: &Account,
    remote: &'a [RemoteAccountSnapshot],
) -> Option<&'a RemoteAccountSnapshot> {
    let login_id = account.login_id()?;
    remote.iter().find(|r| {
        r.login.id == login_id
            && (account.caretaker_id.is_none() || account.caretaker_id == r.caretaker_id)
    })
}

/// 按 ID 去重，保留首次出现的一项，顺序不变
pub fn dedup_periods(periods: &[RemotePeriod]) -> Vec<RemotePeriod> {
    let mut seen = HashSet::with_capacity(periods.len());
    periods
        .iter()
        .filter(|p| seen.insert(p.id))
        .cloned()
        .collect()
}

fn single_current_id(
    account_id: i64,
    side: PeriodSide,
    current_ids: impl Iterator<Item = i64>,
) -> std::result::Result<i64, CurrentPeriodViolation> {
    let ids: Vec<i64> = current_ids.collect();
    match ids.as_slice() {
        [id] => Ok(*id),
        [] => Err(CurrentPeriodViolation::NoneMarked { account_id, side }),
        _ => Err(CurrentPeriodViolation::MultipleMarked {
            account_id,
            side,
            count: ids.len(),
        }),
    }
}

/// `remote` 必须已去重
pub fn periods_changed(
    account_id: i64,
    local: &[Period],
    remote: &[RemotePeriod],
) -> std::result::Result<bool, CurrentPeriodViolation> {
    let local_ids: HashSet<i64> = local.iter().map(|p| p.id).collect();
    if remote.iter().any(|p| !local_ids.contains(&p.id)) {
        return Ok(true);
    }

    let remote_current = single_current_id(
        account_id,
        PeriodSide::Remote,
        remote.iter().filter(|p| p.current).map(|p| p.id),
    )?;
    let local_current = single_current_id(
        account_id,
        PeriodSide::Local,
        local.iter().filter(|p| p.current).map(|p| p.id),
    )?;

    Ok(remote_current != local_current)
}

pub fn reconcile_account(
    mut account: Account,
    remote: &[RemoteAccountSnapshot],
) -> Result<ReconcileOutcome> {
    let Some(snapshot) = find_remote_match(&account, remote) else {
        return Ok(ReconcileOutcome::Unmatched(account));
    };
    if snapshot.periods.is_empty() {
        return Ok(ReconcileOutcome::Unmatched(account));
    }

    let deduplicated = dedup_periods(&snapshot.periods);
    let periods_replaced = periods_changed(account.id, &account.periods, &deduplicated)?;

    if periods_replaced {
        account.periods = deduplicated.iter().map(map_period).collect();
    }

    account.pupil_number = snapshot.journal.pupil_number;
    account.capabilities = snapshot.capabilities.clone();

    Ok(ReconcileOutcome::Updated {
        account,
        periods_replaced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::account_sync::test_support::{account, period, remote_period, snapshot};

    fn ids(periods: &[Period]) -> Vec<i64> {
        periods.iter().map(|p| p.id).collect()
    }

    #[test]
    fn match_requires_same_login() {
        let acc = account(1, Some(10), None, vec![period(1, true)]);
        let remote = vec![snapshot(11, None, vec![remote_period(1, true)])];
        assert!(find_remote_match(&acc, &remote).is_none());
    }

    #[test]
    fn match_without_local_caretaker_takes_first_in_order() {
        let acc = account(1, Some(10), None, vec![period(1, true)]);
        let remote = vec![
            snapshot(10, Some(500), vec![remote_period(1, true)]),
            snapshot(10, Some(600), vec![remote_period(1, true)]),
        ];
        let found = find_remote_match(&acc, &remote).unwrap();
        assert_eq!(found.caretaker_id, Some(500));
    }

    #[test]
    fn match_with_local_caretaker_is_exact() {
        let acc = account(1, Some(10), Some(600), vec![period(1, true)]);
        let remote = vec![
            snapshot(10, Some(500), vec![remote_period(1, true)]),
            snapshot(10, Some(600), vec![remote_period(1, true)]),
        ];
        assert_eq!(find_remote_match(&acc, &remote).unwrap().caretaker_id, Some(600));

        let acc = account(1, Some(10), Some(700), vec![period(1, true)]);
        assert!(find_remote_match(&acc, &remote).is_none());
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let mut second_one = remote_period(1, false);
        second_one.number = 99;
        let deduped = dedup_periods(&[remote_period(1, true), remote_period(2, false), second_one]);
        assert_eq!(deduped.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(deduped[0].current);
        assert_ne!(deduped[0].number, 99);
    }

    #[test]
    fn duplicated_remote_periods_are_stored_once() {
        let acc = account(1, Some(10), None, vec![period(1, true)]);
        let remote = vec![snapshot(
            10,
            None,
            vec![remote_period(1, false), remote_period(2, true), remote_period(1, false)],
        )];
        let outcome = reconcile_account(acc, &remote).unwrap();
        assert_eq!(ids(&outcome.account().periods), vec![1, 2]);
    }

    #[test]
    fn added_period_triggers_replacement_regardless_of_current() {
        let acc = account(1, Some(10), None, vec![period(1, false), period(2, true)]);
        let remote = vec![snapshot(
            10,
            None,
            vec![remote_period(1, false), remote_period(2, true), remote_period(3, false)],
        )];
        match reconcile_account(acc, &remote).unwrap() {
            ReconcileOutcome::Updated { account, periods_replaced } => {
                assert!(periods_replaced);
                assert_eq!(ids(&account.periods), vec![1, 2, 3]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn added_period_skips_current_check_even_when_malformed() {
        // 第 1 步已判定变化，不会走到 current 唯一性校验
        let acc = account(1, Some(10), None, vec![period(1, false), period(2, false)]);
        let remote = vec![snapshot(10, None, vec![remote_period(3, false)])];
        assert!(reconcile_account(acc, &remote).is_ok());
    }

    #[test]
    fn swapped_current_marker_triggers_replacement() {
        let acc = account(1, Some(10), None, vec![period(1, true), period(2, false)]);
        let remote = vec![snapshot(10, None, vec![remote_period(1, false), remote_period(2, true)])];
        match reconcile_account(acc, &remote).unwrap() {
            ReconcileOutcome::Updated { account, periods_replaced } => {
                assert!(periods_replaced);
                assert!(!account.periods[0].current);
                assert!(account.periods[1].current);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unchanged_periods_kept_but_scalars_overwritten() {
        let mut local_periods = vec![period(1, false), period(2, true)];
        // 本地描述字段与服务端不同，用来确认没有被替换
        local_periods[0].number = 42;
        let mut acc = account(1, Some(10), None, local_periods.clone());
        acc.pupil_number = Some(3);
        acc.capabilities = vec!["OLD".to_string()];

        let mut remote_snapshot =
            snapshot(10, None, vec![remote_period(2, true), remote_period(1, false)]);
        remote_snapshot.journal.pupil_number = Some(17);
        remote_snapshot.capabilities = vec!["REGULAR".to_string(), "TOPICS_ENABLED".to_string()];

        match reconcile_account(acc, &[remote_snapshot]).unwrap() {
            ReconcileOutcome::Updated { account, periods_replaced } => {
                assert!(!periods_replaced);
                assert_eq!(account.periods, local_periods);
                assert_eq!(account.pupil_number, Some(17));
                assert_eq!(account.capabilities, vec!["REGULAR", "TOPICS_ENABLED"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn removed_period_alone_does_not_trigger_replacement() {
        let acc = account(1, Some(10), None, vec![period(1, false), period(2, true)]);
        let remote = vec![snapshot(10, None, vec![remote_period(2, true)])];
        match reconcile_account(acc, &remote).unwrap() {
            ReconcileOutcome::Updated { account, periods_replaced } => {
                assert!(!periods_replaced);
                assert_eq!(ids(&account.periods), vec![1, 2]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unmatched_or_periodless_snapshot_leaves_account_untouched() {
        let acc = account(1, Some(10), None, vec![period(1, true)]);
        let no_periods = vec![snapshot(10, None, vec![])];
        assert_eq!(
            reconcile_account(acc.clone(), &no_periods).unwrap(),
            ReconcileOutcome::Unmatched(acc.clone())
        );
        assert_eq!(
            reconcile_account(acc.clone(), &[]).unwrap(),
            ReconcileOutcome::Unmatched(acc)
        );
    }

    #[test]
    fn missing_remote_current_is_contract_violation() {
        let acc = account(1, Some(10), None, vec![period(1, true)]);
        let remote = vec![snapshot(10, None, vec![remote_period(1, false)])];
        let err = reconcile_account(acc, &remote).unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn multiple_local_current_is_contract_violation() {
        let local = vec![period(1, true), period(2, true)];
        let remote = dedup_periods(&[remote_period(1, true), remote_period(2, false)]);
        assert_eq!(
            periods_changed(5, &local, &remote),
            Err(CurrentPeriodViolation::MultipleMarked {
                account_id: 5,
                side: PeriodSide::Local,
                count: 2
            })
        );
    }
}
