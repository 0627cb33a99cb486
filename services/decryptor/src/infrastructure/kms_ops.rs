//! KMS操作モジュール
//!
//! 暗号文をKMS Decrypt APIで復号する。

use async_trait::async_trait;
use aws_sdk_kms::Client as KmsClient;
use aws_sdk_kms::primitives::Blob;
use thiserror::Error;
use tracing::info;

/// KMS操作のエラー型
#[derive(Debug, Clone, Error, PartialEq)]
pub enum KmsOpsError {
    /// AWS SDK エラー
    #[error("AWS KMS APIエラー: {0}")]
    AwsSdkError(String),
    /// レスポンスに平文が含まれていない
    #[error("KMSレスポンスに平文が含まれていません")]
    MissingPlaintext,
}

/// KMS操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait KmsOps: Send + Sync {
    /// 暗号文を指定キーで復号する
    async fn decrypt(&self, ciphertext: &[u8], key_id: &str) -> Result<Vec<u8>, KmsOpsError>;
}

/// 実際のAWS KMS SDKを使用したKMS操作実装
pub struct AwsKmsOps {
    client: KmsClient,
}

impl AwsKmsOps {
    pub fn new(client: KmsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KmsOps for AwsKmsOps {
    async fn decrypt(&self, ciphertext: &[u8], key_id: &str) -> Result<Vec<u8>, KmsOpsError> {
        let response = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(ciphertext))
            .key_id(key_id)
            .send()
            .await
            .map_err(|e| KmsOpsError::AwsSdkError(e.into_service_error().to_string()))?;

        let plaintext = response
            .plaintext()
            .ok_or(KmsOpsError::MissingPlaintext)?
            .as_ref()
            .to_vec();

        info!(
            key_id = %key_id,
            ciphertext_length = ciphertext.len(),
            plaintext_length = plaintext.len(),
            "KMS復号成功"
        );
        Ok(plaintext)
    }
}
