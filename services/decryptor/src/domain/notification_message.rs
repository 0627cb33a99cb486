/// 処理結果通知メッセージ
///
/// SNSトピックに発行する処理結果のJSON構造を定義する。
use serde::{Deserialize, Serialize};

/// SNSの件名の最大文字数
pub const MAX_SUBJECT_LENGTH: usize = 100;

/// 処理結果ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationStatus {
    Success,
    Error,
}

impl NotificationStatus {
    /// 通知メッセージ上の表記
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Success => "SUCCESS",
            NotificationStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// オブジェクトの所在（バケットとキー）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// 処理結果通知メッセージ
///
/// `destination`は成功時のみ、`error`は失敗時のみ設定される想定。
/// 未設定のフィールドはJSONに出力しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// 処理結果ステータス
    pub status: NotificationStatus,
    /// タイムスタンプ（ISO 8601形式）
    pub timestamp: String,
    /// 入力オブジェクト
    pub source: ObjectLocation,
    /// 出力オブジェクト
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<ObjectLocation>,
    /// エラーメッセージ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationMessage {
    /// 新しいNotificationMessageを作成
    ///
    /// 出力先キーが与えられた場合のみ`destination`を同じバケットで設定する。
    pub fn new(
        status: NotificationStatus,
        timestamp: impl Into<String>,
        bucket: &str,
        source_key: &str,
        destination_key: Option<&str>,
        error: Option<&str>,
    ) -> Self {
        Self {
            status,
            timestamp: timestamp.into(),
            source: ObjectLocation::new(bucket, source_key),
            destination: destination_key.map(|key| ObjectLocation::new(bucket, key)),
            error: error.map(|e| e.to_string()),
        }
    }

    /// SNSの件名を作成
    ///
    /// `File Processing {status}: {sourceKey}`形式。
    /// SNSの制限を超える場合は文字境界で切り詰める。
    pub fn subject(&self) -> String {
        let subject = format!("File Processing {}: {}", self.status, self.source.key);
        if subject.chars().count() <= MAX_SUBJECT_LENGTH {
            return subject;
        }
        subject.chars().take(MAX_SUBJECT_LENGTH).collect()
    }
}
