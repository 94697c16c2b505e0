//! 服务端账号列表的线上数据结构（字段名为 PascalCase）

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteLogin {
    pub id: i64,
    /// 登录名
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteDate {
    pub date: NaiveDate,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemotePeriod {
    pub id: i64,
    pub level: i32,
    pub number: i32,
    pub current: bool,
    pub last: bool,
    pub start: RemoteDate,
    pub end: RemoteDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteJournal {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub pupil_number: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemotePupil {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub surname: String,
}

/// 账号列表中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteAccountSnapshot {
    pub login: RemoteLogin,
    #[serde(default)]
    pub caretaker_id: Option<i64>,
    /// 原始学期列表，可能包含重复 ID
    #[serde(default)]
    pub periods: Vec<RemotePeriod>,
    #[serde(default)]
    pub journal: RemoteJournal,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub pupil: RemotePupil,
}
