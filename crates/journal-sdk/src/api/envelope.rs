//! 服务端统一响应信封
//!
//! ```json
//! { "Envelope": ..., "Status": { "Code": 0, "Message": "OK" }, "RequestId": "...", "Timestamp": 0 }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{JournalSDKError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnvelopeStatus {
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    /// 出错时服务端返回 null
    pub envelope: Option<T>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.code == 0
    }

    /// 非 0 状态码转为 `JournalSDKError::Api`；成功但无负载视为数据错误
    pub fn into_result(self) -> Result<T> {
        if !self.is_success() {
            return Err(JournalSDKError::Api {
                code: self.status.code,
                message: self.status.message,
            });
        }
        self.envelope.ok_or_else(|| {
            JournalSDKError::Serialization(format!(
                "响应缺少 Envelope 负载 (request_id={:?})",
                self.request_id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_yields_payload() {
        let env: Envelope<Vec<i32>> = serde_json::from_value(json!({
            "Envelope": [1, 2],
            "Status": { "Code": 0, "Message": "OK" },
            "RequestId": "abc"
        }))
        .unwrap();
        assert_eq!(env.into_result().unwrap(), vec![1, 2]);
    }

    #[test]
    fn non_zero_status_is_api_error() {
        let env: Envelope<Vec<i32>> = serde_json::from_value(json!({
            "Envelope": null,
            "Status": { "Code": 108, "Message": "Certificate not found" }
        }))
        .unwrap();
        match env.into_result() {
            Err(JournalSDKError::Api { code, message }) => {
                assert_eq!(code, 108);
                assert_eq!(message, "Certificate not found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn missing_payload_is_serialization_error() {
        let env: Envelope<Vec<i32>> = serde_json::from_value(json!({
            "Status": { "Code": 0 }
        }))
        .unwrap();
        assert!(matches!(env.into_result(), Err(JournalSDKError::Serialization(_))));
    }
}
