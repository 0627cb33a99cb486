//! SNS操作モジュール
//!
//! 処理結果通知をSNSトピックに発行する。

use async_trait::async_trait;
use aws_sdk_sns::Client as SnsClient;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// SNS操作のエラー型
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SnsOpsError {
    /// AWS SDK エラー
    #[error("AWS SNS APIエラー: {0}")]
    AwsSdkError(String),
    /// JSON シリアライズエラー
    #[error("JSONシリアライズエラー: {0}")]
    SerializeError(String),
}

/// SNS操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait SnsOps: Send + Sync {
    /// メッセージをSNSトピックに発行し、メッセージIDを返す
    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        subject: Option<&str>,
    ) -> Result<String, SnsOpsError>;

    /// シリアライズ可能な値をJSONとしてSNSトピックに発行する
    async fn publish_json<T: Serialize + Send + Sync>(
        &self,
        topic_arn: &str,
        value: &T,
        subject: Option<&str>,
    ) -> Result<String, SnsOpsError> {
        let message = serde_json::to_string(value)
            .map_err(|e| SnsOpsError::SerializeError(e.to_string()))?;

        self.publish(topic_arn, &message, subject).await
    }
}

/// 実際のAWS SNS SDKを使用したSNS操作実装
pub struct AwsSnsOps {
    client: SnsClient,
}

impl AwsSnsOps {
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SnsOps for AwsSnsOps {
    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        subject: Option<&str>,
    ) -> Result<String, SnsOpsError> {
        let mut request = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message);

        if let Some(subj) = subject {
            request = request.subject(subj);
        }

        match request.send().await {
            Ok(response) => {
                let message_id = response.message_id().unwrap_or("unknown").to_string();
                info!(
                    topic_arn = %topic_arn,
                    message_id = %message_id,
                    "SNS Publish成功"
                );
                Ok(message_id)
            }
            Err(err) => {
                let message = err.into_service_error().to_string();
                warn!(topic_arn = %topic_arn, error = %message, "SNS Publishエラー");
                Err(SnsOpsError::AwsSdkError(message))
            }
        }
    }
}
