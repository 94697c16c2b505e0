//! 账号同步引擎
//!
//! 一次同步：过期判断 → 读取本地账号 → 按登录分组 → 每组拉一次服务端账号列表
//! → 逐个账号合并并落库 → 全部成功后写入同步时间。
//!
//! ## NOTE: Engine 不做重试
//!
//! 任意一步失败都直接返回错误，且不写同步时间；已经落库的账号保留，
//! 下次调用会重新完整执行一遍（合并是幂等的）。

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::client::ApiClientExt;
use crate::api::endpoints::{unit_scoped_path, RegisterHebeQuery, REGISTER_HEBE_ENDPOINT};
use crate::api::factory::ApiClientFactory;
use crate::api::models::RemoteAccountSnapshot;
use crate::error::Result;
use crate::storage::entities::Account;
use crate::storage::AccountRepository;
use crate::sync::gate::StalenessGate;
use crate::sync::resource_store::{SyncStateStore, ACCOUNTS_SYNC_KEY};
use super::grouping::{group_by_login, LoginGroup};
use super::reconcile::{reconcile_account, ReconcileOutcome};

/// 一次同步的结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSyncReport {
    /// 仍在有效期内，未执行
    pub skipped: bool,
    /// 拉取次数（= 登录分组数）
    pub groups: usize,
    pub updated: usize,
    pub periods_replaced: usize,
    /// 服务端没有对应账号的本地账号数
    pub unmatched: usize,
    /// 活跃账号被更新时，携带更新后的值
    pub active_account: Option<Account>,
}

impl AccountSyncReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }
}

pub struct AccountSyncService {
    repository: Arc<dyn AccountRepository>,
    api_factory: Arc<dyn ApiClientFactory>,
    sync_state: Arc<dyn SyncStateStore>,
    gate: StalenessGate,
}

impl AccountSyncService {
    pub fn new(
        repository: Arc<dyn AccountRepository>,
        api_factory: Arc<dyn ApiClientFactory>,
        sync_state: Arc<dyn SyncStateStore>,
        gate: StalenessGate,
    ) -> Self {
        Self {
            repository,
            api_factory,
            sync_state,
            gate,
        }
    }

    /// 仅在上次同步已过期时执行
    pub async fn sync_accounts_if_required(&self, active_account_id: Option<i64>) -> Result<AccountSyncReport> {
        self.sync_accounts(active_account_id, false).await
    }

    /// `force = true` 时跳过过期判断
    pub async fn sync_accounts(&self, active_account_id: Option<i64>, force: bool) -> Result<AccountSyncReport> {
        self.sync_accounts_at(active_account_id, force, Utc::now()).await
    }

    pub(crate) async fn sync_accounts_at(
        &self,
        active_account_id: Option<i64>,
        force: bool,
        now: DateTime<Utc>,
    ) -> Result<AccountSyncReport> {
        if !force {
            let last_synced = self.sync_state.get_last_synced(ACCOUNTS_SYNC_KEY).await?;
            if !self.gate.should_sync(last_synced, now) {
                debug!("账号同步仍在有效期内，跳过 (last_synced={:?})", last_synced);
                return Ok(AccountSyncReport::skipped());
            }
        }

        info!("🔄 开始账号同步 (force={})", force);

        let accounts = self.repository.list_accounts().await?;
        let groups = group_by_login(accounts);
        let mut report = AccountSyncReport {
            groups: groups.len(),
            ..Default::default()
        };

        for group in groups {
            self.sync_group(group, active_account_id, &mut report).await?;
        }

        self.sync_state.set_last_synced(ACCOUNTS_SYNC_KEY, now).await?;

        info!(
            "✅ 账号同步完成: {} 个登录, 更新 {} 个账号 (学期替换 {}), 未匹配 {}",
            report.groups, report.updated, report.periods_replaced, report.unmatched
        );
        Ok(report)
    }

    async fn sync_group(
        &self,
        group: LoginGroup,
        active_account_id: Option<i64>,
        report: &mut AccountSyncReport,
    ) -> Result<()> {
        let remote = self.fetch_remote_accounts(group.representative()).await.map_err(|e| {
            warn!("❌ 拉取登录 {} 的账号列表失败: {}", group.login_id, e);
            e
        })?;
        debug!("登录 {} 返回 {} 个服务端账号", group.login_id, remote.len());

        for account in group.accounts {
            match reconcile_account(account, &remote)? {
                ReconcileOutcome::Unmatched(account) => {
                    debug!("账号 {} 在服务端没有对应项，保持不变", account.id);
                    report.unmatched += 1;
                }
                ReconcileOutcome::Updated {
                    account,
                    periods_replaced,
                } => {
                    self.repository.update_account(&account).await?;
                    report.updated += 1;
                    if periods_replaced {
                        debug!("账号 {} 学期已替换为 {} 个", account.id, account.periods.len());
                        report.periods_replaced += 1;
                    }
                    if active_account_id == Some(account.id) {
                        report.active_account = Some(account);
                    }
                }
            }
        }
        Ok(())
    }

    /// 账号列表走单位级服务器，路径需去掉实例级前缀
    async fn fetch_remote_accounts(&self, representative: &Account) -> Result<Vec<RemoteAccountSnapshot>> {
        let client = self.api_factory.get_authenticated(representative).await?;
        let query = RegisterHebeQuery::default().to_query();
        let snapshots: Vec<RemoteAccountSnapshot> = client
            .get_envelope(unit_scoped_path(REGISTER_HEBE_ENDPOINT), &query)
            .await?;
        Ok(snapshots)
    }
}
