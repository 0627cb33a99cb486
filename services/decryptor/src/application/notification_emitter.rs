/// 処理結果通知
///
/// 処理結果をNotificationMessageにまとめてSNSトピックに発行する。
/// 発行失敗は呼び出し元に返し、握りつぶすかどうかは呼び出し元が決める。
use thiserror::Error;
use tracing::info;

use crate::domain::{NotificationMessage, NotificationStatus};
use crate::infrastructure::{SnsOps, SnsOpsError};

/// 通知のエラー型
#[derive(Debug, Error, PartialEq)]
pub enum NotifyError {
    #[error("通知の発行に失敗しました: {0}")]
    Publish(#[from] SnsOpsError),
}

/// 通知結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// 通知先が未設定のため発行しなかった
    Disabled,
    /// 発行した
    Published { message_id: String },
}

/// 処理結果通知の発行者
pub struct NotificationEmitter<S>
where
    S: SnsOps,
{
    sns: S,
    /// 通知先SNSトピックARN（Noneなら通知しない）
    topic_arn: Option<String>,
}

impl<S> NotificationEmitter<S>
where
    S: SnsOps,
{
    pub fn new(sns: S, topic_arn: Option<String>) -> Self {
        Self { sns, topic_arn }
    }

    /// 通知先が設定されているか
    pub fn is_enabled(&self) -> bool {
        self.topic_arn.is_some()
    }

    /// 処理結果を通知する
    ///
    /// `destination_key`は成功時、`error`は失敗時に指定する。
    pub async fn notify(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: Option<&str>,
        status: NotificationStatus,
        error: Option<&str>,
    ) -> Result<NotifyOutcome, NotifyError> {
        let Some(topic_arn) = self.topic_arn.as_deref() else {
            info!(status = %status, key = %source_key, "SNS_TOPIC_ARNが未設定のため通知をスキップ");
            return Ok(NotifyOutcome::Disabled);
        };

        let timestamp = chrono::Utc::now().to_rfc3339();
        let message = NotificationMessage::new(
            status,
            timestamp,
            bucket,
            source_key,
            destination_key,
            error,
        );
        let subject = message.subject();

        let message_id = self
            .sns
            .publish_json(topic_arn, &message, Some(subject.as_str()))
            .await?;

        info!(
            status = %status,
            key = %source_key,
            message_id = %message_id,
            "処理結果を通知"
        );
        Ok(NotifyOutcome::Published { message_id })
    }
}
