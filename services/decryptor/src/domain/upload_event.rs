/// S3アップロードイベント
///
/// EventBridge経由で届くS3 Object Createdイベントから
/// バケット名とオブジェクトキーを取り出す。
use serde_json::Value;
use thiserror::Error;

/// イベント構造検証のエラー型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventValidationError {
    /// detailが欠落
    #[error("Missing detail in event")]
    MissingDetail,
    /// detail.bucket.nameが欠落
    #[error("Missing bucket.name in event detail")]
    MissingBucketName,
    /// detail.object.keyが欠落
    #[error("Missing object.key in event detail")]
    MissingObjectKey,
}

/// 検証済みのアップロードイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    /// バケット名
    pub bucket: String,
    /// オブジェクトキー
    pub key: String,
}

impl UploadEvent {
    /// イベントペイロードを検証してUploadEventを作成
    ///
    /// `detail.bucket.name`と`detail.object.key`が文字列として存在する必要がある。
    /// nullや文字列以外の値は欠落として扱う。
    pub fn from_value(event: &Value) -> Result<Self, EventValidationError> {
        let detail = event
            .get("detail")
            .filter(|v| v.is_object())
            .ok_or(EventValidationError::MissingDetail)?;

        let bucket = detail
            .get("bucket")
            .and_then(|b| b.get("name"))
            .and_then(|v| v.as_str())
            .ok_or(EventValidationError::MissingBucketName)?;

        let key = detail
            .get("object")
            .and_then(|o| o.get("key"))
            .and_then(|v| v.as_str())
            .ok_or(EventValidationError::MissingObjectKey)?;

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}
