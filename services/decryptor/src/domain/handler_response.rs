/// Lambdaハンドラーの応答
///
/// `{ "statusCode": ..., "body": ... }`形式で呼び出し元に返す。
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// イベント構造不正時の応答本文
pub const INVALID_EVENT_BODY: &str = "Invalid event structure";

/// 処理対象外キーをスキップした時の応答本文
pub const SKIPPED_BODY: &str = "File not in raw directory, skipping";

/// ハンドラー応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResponse {
    /// HTTPステータスコード相当の値
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// 応答本文
    pub body: String,
}

impl HandlerResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// イベント構造不正（400）
    pub fn malformed_event() -> Self {
        Self::new(400, INVALID_EVENT_BODY)
    }

    /// 処理対象外のためスキップ（200）
    pub fn skipped() -> Self {
        Self::new(200, SKIPPED_BODY)
    }

    /// 復号成功（200）
    pub fn decrypted(source_key: &str, destination_key: &str) -> Self {
        Self::new(
            200,
            format!("Successfully decrypted {} to {}", source_key, destination_key),
        )
    }

    /// 処理失敗（500）
    pub fn processing_failure(error: impl std::fmt::Display) -> Self {
        Self::new(500, format!("Error: {}", error))
    }

    /// JSON値に変換
    pub fn into_value(self) -> Value {
        serde_json::json!({
            "statusCode": self.status_code,
            "body": self.body,
        })
    }
}
