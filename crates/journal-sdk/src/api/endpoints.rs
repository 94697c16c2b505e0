//! 接口路径与查询参数
//!
//! 实例级接口（instance API）路径都以 `api/` 开头；单位级服务器（unit API）
//! 不带这一前缀，调用单位级接口前需用 [`unit_scoped_path`] 去掉它。

use serde::Serialize;

/// 实例级路径前缀
pub const INSTANCE_PATH_PREFIX: &str = "api/";

/// 注册 / 账号列表接口（返回当前登录下的所有账号）
pub const REGISTER_HEBE_ENDPOINT: &str = "api/mobile/register/hebe";

/// 把实例级路径转换为单位级路径（去掉前导 `api/`）；已经是单位级路径时原样返回
pub fn unit_scoped_path(endpoint: &str) -> &str {
    let trimmed = endpoint.trim_start_matches('/');
    trimmed.strip_prefix(INSTANCE_PATH_PREFIX).unwrap_or(trimmed)
}

/// 账号列表查询参数
#[derive(Debug, Clone, Serialize)]
pub struct RegisterHebeQuery {
    /// 客户端模式（移动端固定为 2）
    pub mode: i32,
}

impl Default for RegisterHebeQuery {
    fn default() -> Self {
        Self { mode: 2 }
    }
}

impl RegisterHebeQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![("mode".to_string(), self.mode.to_string())]
    }
}
