//! オブジェクトストア操作モジュール
//!
//! S3上のオブジェクトの取得と書き込みを提供する。

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use thiserror::Error;
use tracing::{debug, info};

/// オブジェクトストア操作のエラー型
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ObjectStoreError {
    /// GetObject APIエラー
    #[error("Failed to get object s3://{bucket}/{key}: {message}")]
    GetError {
        bucket: String,
        key: String,
        message: String,
    },
    /// レスポンスボディの読み込みエラー
    #[error("Failed to read body of s3://{bucket}/{key}: {message}")]
    ReadBodyError {
        bucket: String,
        key: String,
        message: String,
    },
    /// PutObject APIエラー
    #[error("Failed to put object s3://{bucket}/{key}: {message}")]
    PutError {
        bucket: String,
        key: String,
        message: String,
    },
}

/// 書き込み時の暗号化指定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutEncryption {
    /// バケットのデフォルト設定に任せる（暗号化パラメータを送らない）
    BucketDefault,
    /// 指定したKMSキーでSSE-KMS暗号化する
    SseKms { key_id: String },
}

impl PutEncryption {
    /// KMSキーIDの有無から暗号化指定を決める
    pub fn from_kms_key_id(kms_key_id: Option<&str>) -> Self {
        match kms_key_id {
            Some(key_id) => PutEncryption::SseKms {
                key_id: key_id.to_string(),
            },
            None => PutEncryption::BucketDefault,
        }
    }
}

/// オブジェクトストア操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// オブジェクトの内容を全て読み込む
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError>;

    /// オブジェクトを書き込む
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        encryption: &PutEncryption,
    ) -> Result<(), ObjectStoreError>;
}

/// AWS S3 SDKを使用したオブジェクトストア実装
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::GetError {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.into_service_error().to_string(),
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::ReadBodyError {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let content = data.into_bytes().to_vec();
        debug!(bucket = %bucket, key = %key, size = content.len(), "S3オブジェクト取得");
        Ok(content)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        encryption: &PutEncryption,
    ) -> Result<(), ObjectStoreError> {
        let size = body.len();
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));

        if let PutEncryption::SseKms { key_id } = encryption {
            request = request
                .server_side_encryption(ServerSideEncryption::AwsKms)
                .ssekms_key_id(key_id);
        }

        request.send().await.map_err(|e| ObjectStoreError::PutError {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: e.into_service_error().to_string(),
        })?;

        info!(
            bucket = %bucket,
            key = %key,
            size = size,
            sse_kms = matches!(encryption, PutEncryption::SseKms { .. }),
            "S3オブジェクト書き込み"
        );
        Ok(())
    }
}
