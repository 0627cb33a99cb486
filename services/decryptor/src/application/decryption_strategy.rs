/// 復号方式
///
/// 起動時の設定で一度だけ選択し、全invocationで共有する。
/// KMS復号の失敗は呼び出し元に伝播させず、モック反転にフォールバックする。
use tracing::{debug, warn};

use crate::domain::mock_reverse;
use crate::infrastructure::{DecryptionMode, DecryptorConfig, KmsOps};

/// 復号結果を生成した経路
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptionMethod {
    /// KMS Decrypt APIで復号した
    Kms,
    /// モック反転で変換した
    MockReverse,
    /// KMS復号に失敗したためモック反転で変換した
    MockFallback,
}

/// 復号結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrypted {
    pub content: Vec<u8>,
    pub method: DecryptionMethod,
}

impl Decrypted {
    fn mock(content: &[u8], method: DecryptionMethod) -> Self {
        Self {
            content: mock_reverse(content),
            method,
        }
    }
}

/// 復号方式
pub enum DecryptionStrategy<K>
where
    K: KmsOps,
{
    /// バイト列を反転する
    MockReverse,
    /// KMSで復号する（キーID未設定時はモック反転）
    KeyManagement { kms: K, key_id: Option<String> },
}

impl<K> DecryptionStrategy<K>
where
    K: KmsOps,
{
    /// 設定から復号方式を選択
    pub fn from_config(config: &DecryptorConfig, kms: K) -> Self {
        match config.decryption_mode() {
            DecryptionMode::Mock => DecryptionStrategy::MockReverse,
            DecryptionMode::Kms => DecryptionStrategy::KeyManagement {
                kms,
                key_id: config.kms_key_id().map(|id| id.to_string()),
            },
        }
    }

    /// 内容を復号する
    ///
    /// 入力バイト列のみから結果が決まり、失敗しない。
    pub async fn decrypt(&self, content: &[u8]) -> Decrypted {
        match self {
            DecryptionStrategy::MockReverse => {
                debug!(size = content.len(), "モック復号");
                Decrypted::mock(content, DecryptionMethod::MockReverse)
            }
            DecryptionStrategy::KeyManagement { key_id: None, .. } => {
                warn!("KMS_KEY_IDが未設定のためモック復号を使用");
                Decrypted::mock(content, DecryptionMethod::MockReverse)
            }
            DecryptionStrategy::KeyManagement {
                kms,
                key_id: Some(key_id),
            } => match kms.decrypt(content, key_id).await {
                Ok(plaintext) => Decrypted {
                    content: plaintext,
                    method: DecryptionMethod::Kms,
                },
                Err(err) => {
                    warn!(key_id = %key_id, error = %err, "KMS復号失敗、モック復号にフォールバック");
                    Decrypted::mock(content, DecryptionMethod::MockFallback)
                }
            },
        }
    }
}
