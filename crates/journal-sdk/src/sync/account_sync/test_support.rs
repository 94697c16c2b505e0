//! 账号同步测试用的构造函数与内存替身

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::api::client::ApiClient;
use crate::api::factory::ApiClientFactory;
use crate::api::models::{RemoteAccountSnapshot, RemoteDate, RemoteJournal, RemoteLogin, RemotePeriod, RemotePupil};
use crate::error::{JournalSDKError, Result};
use crate::storage::entities::{Account, Login, Period, Pupil, Unit};
use crate::storage::AccountRepository;
use crate::sync::resource_store::SyncStateStore;

/// 测试日志：`RUST_LOG` 控制级别，重复调用无害
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
}

fn end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

pub fn period(id: i64, current: bool) -> Period {
    Period {
        id,
        level: 3,
        number: id as i32,
        current,
        last: false,
        start: start(),
        end: end(),
    }
}

pub fn remote_period(id: i64, current: bool) -> RemotePeriod {
    RemotePeriod {
        id,
        level: 3,
        number: id as i32,
        current,
        last: false,
        start: RemoteDate { date: start(), timestamp: None },
        end: RemoteDate { date: end(), timestamp: None },
    }
}

pub fn account(id: i64, login_id: Option<i64>, caretaker_id: Option<i64>, periods: Vec<Period>) -> Account {
    Account {
        id,
        login: login_id.map(|id| Login {
            id,
            name: format!("login-{}@example.com", id),
        }),
        caretaker_id,
        pupil: Pupil {
            first_name: "Jan".to_string(),
            last_name: format!("Kowalski-{}", id),
        },
        unit: Unit {
            rest_url: "https://unit.example.com/powiat/000123".to_string(),
            symbol: "000123".to_string(),
        },
        periods,
        pupil_number: None,
        capabilities: Vec::new(),
    }
}

pub fn snapshot(login_id: i64, caretaker_id: Option<i64>, periods: Vec<RemotePeriod>) -> RemoteAccountSnapshot {
    RemoteAccountSnapshot {
        login: RemoteLogin { id: login_id, value: None },
        caretaker_id,
        periods,
        journal: RemoteJournal::default(),
        capabilities: vec!["REGULAR".to_string()],
        pupil: RemotePupil::default(),
    }
}

/// 成功信封
pub fn envelope(snapshots: &[RemoteAccountSnapshot]) -> serde_json::Value {
    json!({
        "Status": { "Code": 0, "Message": "OK" },
        "Envelope": snapshots,
        "RequestId": "test",
    })
}

/// 内存账号仓库；可指定第 N 次（从 1 开始）update 失败
#[derive(Default)]
pub struct FakeRepository {
    accounts: Mutex<Vec<Account>>,
    updates: Mutex<Vec<Account>>,
    update_calls: AtomicUsize,
    fail_on_update: Option<usize>,
}

impl FakeRepository {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            ..Default::default()
        }
    }

    pub fn failing_on_update(mut self, call: usize) -> Self {
        self.fail_on_update = Some(call);
        self
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.lock().clone()
    }

    pub fn updates(&self) -> Vec<Account> {
        self.updates.lock().clone()
    }
}

#[async_trait]
impl AccountRepository for FakeRepository {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.lock().clone())
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        let call = self.update_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_update == Some(call) {
            return Err(JournalSDKError::Database(format!("update #{} failed", call)));
        }
        let mut accounts = self.accounts.lock();
        let slot = accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .ok_or_else(|| JournalSDKError::NotFound(format!("account {}", account.id)))?;
        *slot = account.clone();
        self.updates.lock().push(account.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSyncState {
    marks: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl FakeSyncState {
    pub fn with_mark(resource: &str, at: DateTime<Utc>) -> Self {
        let state = Self::default();
        state.marks.lock().insert(resource.to_string(), at);
        state
    }

    pub fn mark(&self, resource: &str) -> Option<DateTime<Utc>> {
        self.marks.lock().get(resource).copied()
    }
}

#[async_trait]
impl SyncStateStore for FakeSyncState {
    async fn get_last_synced(&self, resource: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.mark(resource))
    }

    async fn set_last_synced(&self, resource: &str, at: DateTime<Utc>) -> Result<()> {
        self.marks.lock().insert(resource.to_string(), at);
        Ok(())
    }
}

/// 按登录返回预置响应；未预置的登录在请求时返回传输错误
#[derive(Default)]
pub struct FakeApiFactory {
    responses: HashMap<i64, serde_json::Value>,
    fetches: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl FakeApiFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, login_id: i64, snapshots: Vec<RemoteAccountSnapshot>) -> Self {
        self.responses.insert(login_id, envelope(&snapshots));
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().clone()
    }
}

struct FakeApiClient {
    login_id: i64,
    response: Option<serde_json::Value>,
    fetches: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ApiClient for FakeApiClient {
    async fn get_json(&self, path: &str, _query: &[(String, String)]) -> Result<serde_json::Value> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().push(path.to_string());
        self.response
            .clone()
            .ok_or_else(|| JournalSDKError::Transport(format!("login {} unreachable", self.login_id)))
    }
}

#[async_trait]
impl ApiClientFactory for FakeApiFactory {
    async fn get_authenticated(&self, account: &Account) -> Result<Arc<dyn ApiClient>> {
        let login_id = account
            .login_id()
            .ok_or_else(|| JournalSDKError::Auth(format!("account {} has no login", account.id)))?;
        Ok(Arc::new(FakeApiClient {
            login_id,
            response: self.responses.get(&login_id).cloned(),
            fetches: self.fetches.clone(),
            paths: self.paths.clone(),
        }))
    }
}
