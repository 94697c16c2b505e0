//! 数据实体定义 - 对应数据库表结构
//!
//! Account 为本地账号（一个学生 / 被监护人一条），Period 为学期，
//! Login 为登录凭据（一个登录可对应多个账号）。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 登录凭据 - 多个账号可共享同一个 Login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Login {
    pub id: i64,
    /// 登录名（邮箱或用户名），仅展示用
    pub name: String,
}

/// 学生信息（本同步流程不修改）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pupil {
    pub first_name: String,
    pub last_name: String,
}

/// 组织单位（学校）寻址信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// 单位级 REST 根地址，例如 https://lekcjaplus.vulcan.net.pl/powiat/000123
    pub rest_url: String,
    pub symbol: String,
}

/// 学期实体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// 学期 ID（同一账号内唯一）
    pub id: i64,
    pub level: i32,
    pub number: i32,
    /// 是否为当前学期（每个账号至多一个）
    pub current: bool,
    /// 是否为学年最后一个学期
    pub last: bool,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// 账号实体 - 对应 account 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    /// 所属登录；None 表示尚未绑定凭据，同步时跳过
    pub login: Option<Login>,
    /// 监护关系 ID，用于区分同一登录下的多个被监护人
    pub caretaker_id: Option<i64>,
    pub pupil: Pupil,
    pub unit: Unit,
    /// 有序学期列表
    pub periods: Vec<Period>,
    pub pupil_number: Option<i32>,
    /// 能力标记，原样透传
    pub capabilities: Vec<String>,
}

impl Account {
    /// 当前账号是否具备参与账号同步的条件：有登录、且至少有一个学期
    pub fn is_sync_eligible(&self) -> bool {
        self.login.is_some() && !self.periods.is_empty()
    }

    pub fn login_id(&self) -> Option<i64> {
        self.login.as_ref().map(|l| l.id)
    }
}
