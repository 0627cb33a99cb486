/// オブジェクト変換ハンドラー
///
/// S3アップロードイベントを受け取り、raw/配下のオブジェクトを復号して
/// decrypted/配下に書き出し、処理結果を通知する。
///
/// # 処理フロー
/// 1. イベント構造を検証（不正なら400）
/// 2. raw/配下でなければスキップ（200）
/// 3. オブジェクトを取得
/// 4. 復号（KMS失敗時はモック反転にフォールバック）
/// 5. 出力先キーに書き込み（KMSキー設定時はSSE-KMS）
/// 6. 成功通知（200）
///
/// 3〜5の失敗はエラー通知を試みたうえで500を返す。
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::{DecryptionStrategy, NotificationEmitter};
use crate::domain::{
    HandlerResponse, NotificationStatus, UploadEvent, destination_key, is_raw_key,
};
use crate::infrastructure::{
    DecryptorConfig, KmsOps, ObjectStore, ObjectStoreError, PutEncryption, SnsOps,
};

/// バケットやキーが未確定のままエラー通知する場合の代替値
pub const UNKNOWN_SOURCE: &str = "unknown";

/// 処理失敗の発生箇所
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProcessingError {
    /// オブジェクト取得に失敗
    #[error("{0}")]
    Fetch(ObjectStoreError),
    /// オブジェクト書き込みに失敗
    #[error("{0}")]
    Write(ObjectStoreError),
}

impl ProcessingError {
    /// ログ用の発生箇所名
    pub fn stage(&self) -> &'static str {
        match self {
            ProcessingError::Fetch(_) => "fetch",
            ProcessingError::Write(_) => "write",
        }
    }
}

/// オブジェクト変換ハンドラー
pub struct ObjectTransformHandler<OS, K, S>
where
    OS: ObjectStore,
    K: KmsOps,
    S: SnsOps,
{
    object_store: OS,
    strategy: DecryptionStrategy<K>,
    emitter: NotificationEmitter<S>,
    /// 書き込み時の暗号化指定
    put_encryption: PutEncryption,
}

impl<OS, K, S> ObjectTransformHandler<OS, K, S>
where
    OS: ObjectStore,
    K: KmsOps,
    S: SnsOps,
{
    pub fn new(
        object_store: OS,
        strategy: DecryptionStrategy<K>,
        emitter: NotificationEmitter<S>,
        put_encryption: PutEncryption,
    ) -> Self {
        Self {
            object_store,
            strategy,
            emitter,
            put_encryption,
        }
    }

    /// 設定と各クライアントからハンドラーを組み立てる
    pub fn from_config(config: &DecryptorConfig, object_store: OS, kms: K, sns: S) -> Self {
        Self::new(
            object_store,
            DecryptionStrategy::from_config(config, kms),
            NotificationEmitter::new(sns, config.sns_topic_arn().map(|arn| arn.to_string())),
            PutEncryption::from_kms_key_id(config.kms_key_id()),
        )
    }

    /// イベントを処理して応答を返す
    ///
    /// エラーは全て応答のステータスコードに変換し、呼び出し元には伝播しない。
    pub async fn handle(&self, event: &Value) -> HandlerResponse {
        info!(event = %event, "イベント受信");

        let upload = match UploadEvent::from_value(event) {
            Ok(upload) => upload,
            Err(err) => {
                warn!(error = %err, "イベント構造が不正");
                return HandlerResponse::malformed_event();
            }
        };

        if !is_raw_key(&upload.key) {
            info!(key = %upload.key, "raw/配下のファイルではないためスキップ");
            return HandlerResponse::skipped();
        }

        match self.process(&upload).await {
            Ok(destination_key) => {
                self.notify_success(&upload, &destination_key).await;
                HandlerResponse::decrypted(&upload.key, &destination_key)
            }
            Err(err) => {
                error!(
                    bucket = %upload.bucket,
                    key = %upload.key,
                    stage = err.stage(),
                    error = %err,
                    "ファイル処理エラー"
                );
                self.notify_failure(Some(&upload.bucket), Some(&upload.key), &err)
                    .await;
                HandlerResponse::processing_failure(&err)
            }
        }
    }

    /// 取得・復号・書き込みを順に実行し、出力先キーを返す
    async fn process(&self, upload: &UploadEvent) -> Result<String, ProcessingError> {
        info!(bucket = %upload.bucket, key = %upload.key, "ファイル処理開始");

        let content = self
            .object_store
            .get_object(&upload.bucket, &upload.key)
            .await
            .map_err(ProcessingError::Fetch)?;

        let decrypted = self.strategy.decrypt(&content).await;

        let destination_key = destination_key(&upload.key);
        self.object_store
            .put_object(
                &upload.bucket,
                &destination_key,
                decrypted.content,
                &self.put_encryption,
            )
            .await
            .map_err(ProcessingError::Write)?;

        info!(
            key = %upload.key,
            destination_key = %destination_key,
            method = ?decrypted.method,
            "復号ファイルを保存"
        );
        Ok(destination_key)
    }

    /// 成功通知（失敗してもログのみ）
    async fn notify_success(&self, upload: &UploadEvent, destination_key: &str) {
        if let Err(err) = self
            .emitter
            .notify(
                &upload.bucket,
                &upload.key,
                Some(destination_key),
                NotificationStatus::Success,
                None,
            )
            .await
        {
            error!(key = %upload.key, error = %err, "成功通知の送信に失敗");
        }
    }

    /// エラー通知（失敗してもログのみ）
    ///
    /// バケットやキーが未確定の場合は`unknown`で通知する。
    async fn notify_failure(
        &self,
        bucket: Option<&str>,
        key: Option<&str>,
        failure: &ProcessingError,
    ) {
        let bucket = bucket.unwrap_or(UNKNOWN_SOURCE);
        let key = key.unwrap_or(UNKNOWN_SOURCE);
        let message = failure.to_string();

        if let Err(err) = self
            .emitter
            .notify(bucket, key, None, NotificationStatus::Error, Some(&message))
            .await
        {
            error!(key = %key, error = %err, "エラー通知の送信に失敗");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationMessage;
    use crate::infrastructure::kms_ops::tests::MockKmsOps;
    use crate::infrastructure::logging::init_test_logging;
    use crate::infrastructure::object_store::tests::MockObjectStore;
    use crate::infrastructure::sns_ops::tests::MockSnsOps;
    use crate::infrastructure::{DecryptionMode, KmsOpsError};
    use serde_json::json;

    const BUCKET: &str = "test-bucket";
    const TOPIC_ARN: &str = "arn:aws:sns:ap-northeast-1:123456789012:decryptor";
    const KMS_KEY_ID: &str = "1234abcd-12ab-34cd-56ef-1234567890ab";

    type TestHandler = ObjectTransformHandler<MockObjectStore, MockKmsOps, MockSnsOps>;

    // ==================== テストヘルパー ====================

    struct Fixture {
        handler: TestHandler,
        store: MockObjectStore,
        kms: MockKmsOps,
        sns: MockSnsOps,
    }

    fn create_fixture(config: DecryptorConfig, kms: MockKmsOps, sns: MockSnsOps) -> Fixture {
        init_test_logging();
        let store = MockObjectStore::new();
        let handler =
            ObjectTransformHandler::from_config(&config, store.clone(), kms.clone(), sns.clone());
        Fixture {
            handler,
            store,
            kms,
            sns,
        }
    }

    /// モック反転・通知なしの構成
    fn create_mock_fixture() -> Fixture {
        create_fixture(
            DecryptorConfig::new(DecryptionMode::Mock, None, None),
            MockKmsOps::returning(b""),
            MockSnsOps::new(),
        )
    }

    /// モック反転・通知ありの構成
    fn create_notifying_fixture(sns: MockSnsOps) -> Fixture {
        create_fixture(
            DecryptorConfig::new(DecryptionMode::Mock, None, Some(TOPIC_ARN.to_string())),
            MockKmsOps::returning(b""),
            sns,
        )
    }

    fn create_event(bucket: &str, key: &str) -> Value {
        json!({
            "version": "0",
            "detail-type": "Object Created",
            "source": "aws.s3",
            "detail": {
                "bucket": { "name": bucket },
                "object": { "key": key }
            }
        })
    }

    fn published_messages(sns: &MockSnsOps) -> Vec<NotificationMessage> {
        sns.published()
            .iter()
            .map(|p| serde_json::from_str(&p.message).unwrap())
            .collect()
    }

    // ==================== イベント構造検証 ====================

    #[tokio::test]
    async fn test_invalid_event_structure() {
        let fixture = create_mock_fixture();

        let response = fixture.handler.handle(&json!({"invalid": "data"})).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, "Invalid event structure");
        assert_eq!(fixture.store.get_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_bucket_or_key_is_malformed() {
        let fixture = create_notifying_fixture(MockSnsOps::new());
        let events = [
            json!({"detail": {"object": {"key": "raw/a.txt"}}}),
            json!({"detail": {"bucket": {"name": BUCKET}}}),
            json!({"detail": {"bucket": {"name": null}, "object": {"key": "raw/a.txt"}}}),
        ];

        for event in events {
            let response = fixture.handler.handle(&event).await;
            assert_eq!(response, HandlerResponse::malformed_event());
        }
        assert!(fixture.sns.published().is_empty());
    }

    // ==================== プレフィックスフィルタ ====================

    #[tokio::test]
    async fn test_non_raw_file_is_skipped() {
        let fixture = create_notifying_fixture(MockSnsOps::new());
        fixture.store.insert(BUCKET, "other/testfile.txt", b"hello");

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "other/testfile.txt"))
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "File not in raw directory, skipping");
        assert_eq!(fixture.store.get_count(), 0);
        assert!(fixture.store.puts().is_empty());
        assert!(fixture.sns.published().is_empty());
    }

    #[tokio::test]
    async fn test_decrypted_file_is_skipped() {
        let fixture = create_mock_fixture();

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "decrypted/testfile.txt"))
            .await;

        assert_eq!(response, HandlerResponse::skipped());
        assert!(fixture.store.puts().is_empty());
    }

    // ==================== 正常系 ====================

    #[tokio::test]
    async fn test_valid_event_with_mock_reverse() {
        let fixture = create_mock_fixture();
        fixture.store.insert(BUCKET, "raw/testfile.txt", b"hello");

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "raw/testfile.txt"))
            .await;

        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("Successfully decrypted"));
        assert_eq!(
            response.body,
            "Successfully decrypted raw/testfile.txt to decrypted/testfile.txt"
        );

        let puts = fixture.store.puts();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].bucket, BUCKET);
        assert_eq!(puts[0].key, "decrypted/testfile.txt");
        assert_eq!(puts[0].body, b"olleh".to_vec());
        assert_eq!(puts[0].encryption, PutEncryption::BucketDefault);
    }

    #[tokio::test]
    async fn test_destination_key_replaces_first_raw_only() {
        let fixture = create_mock_fixture();
        fixture.store.insert(BUCKET, "raw/raw/file.txt", b"abc");

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "raw/raw/file.txt"))
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(fixture.store.puts()[0].key, "decrypted/raw/file.txt");
    }

    #[tokio::test]
    async fn test_empty_object_is_processed() {
        let fixture = create_mock_fixture();
        fixture.store.insert(BUCKET, "raw/empty.bin", b"");

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "raw/empty.bin"))
            .await;

        assert_eq!(response.status_code, 200);
        assert!(fixture.store.puts()[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_kms_decrypt_and_sse_kms_write() {
        let fixture = create_fixture(
            DecryptorConfig::new(DecryptionMode::Kms, Some(KMS_KEY_ID.to_string()), None),
            MockKmsOps::returning(b"plaintext"),
            MockSnsOps::new(),
        );
        fixture.store.insert(BUCKET, "raw/secret.bin", b"ciphertext");

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "raw/secret.bin"))
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            fixture.kms.calls(),
            vec![(b"ciphertext".to_vec(), KMS_KEY_ID.to_string())]
        );

        let puts = fixture.store.puts();
        assert_eq!(puts[0].body, b"plaintext".to_vec());
        assert_eq!(
            puts[0].encryption,
            PutEncryption::SseKms {
                key_id: KMS_KEY_ID.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_kms_failure_falls_back_to_mock_reverse() {
        let fixture = create_fixture(
            DecryptorConfig::new(DecryptionMode::Kms, Some(KMS_KEY_ID.to_string()), None),
            MockKmsOps::failing(KmsOpsError::AwsSdkError(
                "InvalidCiphertextException".to_string(),
            )),
            MockSnsOps::new(),
        );
        fixture.store.insert(BUCKET, "raw/testfile.txt", b"hello");

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "raw/testfile.txt"))
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(fixture.kms.calls().len(), 1);
        assert_eq!(fixture.store.puts()[0].body, b"olleh".to_vec());
    }

    #[tokio::test]
    async fn test_kms_mode_without_key_id_uses_mock_and_default_encryption() {
        let fixture = create_fixture(
            DecryptorConfig::new(DecryptionMode::Kms, None, None),
            MockKmsOps::returning(b"unused"),
            MockSnsOps::new(),
        );
        fixture.store.insert(BUCKET, "raw/testfile.txt", b"hello");

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "raw/testfile.txt"))
            .await;

        assert_eq!(response.status_code, 200);
        assert!(fixture.kms.calls().is_empty());
        let puts = fixture.store.puts();
        assert_eq!(puts[0].body, b"olleh".to_vec());
        assert_eq!(puts[0].encryption, PutEncryption::BucketDefault);
    }

    // ==================== 通知 ====================

    #[tokio::test]
    async fn test_success_notification() {
        let fixture = create_notifying_fixture(MockSnsOps::new());
        fixture.store.insert(BUCKET, "raw/testfile.txt", b"hello");

        fixture
            .handler
            .handle(&create_event(BUCKET, "raw/testfile.txt"))
            .await;

        let published = fixture.sns.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic_arn, TOPIC_ARN);
        assert_eq!(
            published[0].subject.as_deref(),
            Some("File Processing SUCCESS: raw/testfile.txt")
        );

        let message = &published_messages(&fixture.sns)[0];
        assert_eq!(message.status, NotificationStatus::Success);
        assert_eq!(message.source.bucket, BUCKET);
        assert_eq!(message.source.key, "raw/testfile.txt");
        let destination = message.destination.as_ref().unwrap();
        assert_eq!(destination.bucket, BUCKET);
        assert_eq!(destination.key, "decrypted/testfile.txt");
        assert!(message.error.is_none());
    }

    #[tokio::test]
    async fn test_success_notification_failure_keeps_200() {
        let fixture = create_notifying_fixture(MockSnsOps::failing("AuthorizationError"));
        fixture.store.insert(BUCKET, "raw/testfile.txt", b"hello");

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "raw/testfile.txt"))
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(fixture.sns.published().len(), 1);
        assert_eq!(fixture.store.puts().len(), 1);
    }

    #[tokio::test]
    async fn test_no_notification_without_topic() {
        let fixture = create_mock_fixture();
        fixture.store.insert(BUCKET, "raw/testfile.txt", b"hello");

        fixture
            .handler
            .handle(&create_event(BUCKET, "raw/testfile.txt"))
            .await;

        assert!(fixture.sns.published().is_empty());
    }

    // ==================== 異常系 ====================

    #[tokio::test]
    async fn test_fetch_failure_returns_500_and_notifies_error() {
        let fixture = create_notifying_fixture(MockSnsOps::new());

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "raw/missing.txt"))
            .await;

        assert_eq!(response.status_code, 500);
        assert!(response.body.starts_with("Error: "));
        assert!(response.body.contains("NoSuchKey"));
        assert!(fixture.store.puts().is_empty());

        let published = fixture.sns.published();
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].subject.as_deref(),
            Some("File Processing ERROR: raw/missing.txt")
        );

        let message = &published_messages(&fixture.sns)[0];
        assert_eq!(message.status, NotificationStatus::Error);
        assert_eq!(message.source.bucket, BUCKET);
        assert_eq!(message.source.key, "raw/missing.txt");
        assert!(message.destination.is_none());
        assert!(message.error.as_deref().unwrap().contains("NoSuchKey"));
    }

    #[tokio::test]
    async fn test_error_notification_failure_keeps_500() {
        let fixture = create_notifying_fixture(MockSnsOps::failing("AuthorizationError"));

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "raw/missing.txt"))
            .await;

        assert_eq!(response.status_code, 500);
        assert_eq!(fixture.sns.published().len(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_returns_500_and_notifies_error() {
        let fixture = create_notifying_fixture(MockSnsOps::new());
        fixture.store.insert(BUCKET, "raw/testfile.txt", b"hello");
        fixture.store.fail_puts_with("AccessDenied");

        let response = fixture
            .handler
            .handle(&create_event(BUCKET, "raw/testfile.txt"))
            .await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body,
            "Error: Failed to put object s3://test-bucket/decrypted/testfile.txt: AccessDenied"
        );

        let message = &published_messages(&fixture.sns)[0];
        assert_eq!(message.status, NotificationStatus::Error);
        assert!(message.destination.is_none());
        assert!(message.error.as_deref().unwrap().contains("AccessDenied"));
    }

    #[tokio::test]
    async fn test_notify_failure_uses_unknown_for_unbound_source() {
        let fixture = create_notifying_fixture(MockSnsOps::new());
        let failure = ProcessingError::Fetch(ObjectStoreError::GetError {
            bucket: BUCKET.to_string(),
            key: "raw/a.txt".to_string(),
            message: "boom".to_string(),
        });

        fixture.handler.notify_failure(None, None, &failure).await;

        let message = &published_messages(&fixture.sns)[0];
        assert_eq!(message.source.bucket, UNKNOWN_SOURCE);
        assert_eq!(message.source.key, UNKNOWN_SOURCE);
        assert_eq!(
            fixture.sns.published()[0].subject.as_deref(),
            Some("File Processing ERROR: unknown")
        );
    }

    #[test]
    fn test_processing_error_stage() {
        let inner = ObjectStoreError::PutError {
            bucket: "b".to_string(),
            key: "k".to_string(),
            message: "m".to_string(),
        };
        assert_eq!(ProcessingError::Fetch(inner.clone()).stage(), "fetch");
        assert_eq!(ProcessingError::Write(inner.clone()).stage(), "write");
        assert_eq!(ProcessingError::Write(inner).to_string(), "Failed to put object s3://b/k: m");
    }
}
