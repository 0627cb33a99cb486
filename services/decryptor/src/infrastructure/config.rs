/// Decryptor Lambda設定
///
/// 起動時に環境変数から一度だけ読み込み、以降は読み取り専用で共有する。
use thiserror::Error;

/// KMSキーIDの環境変数名
pub const KMS_KEY_ID_VAR: &str = "KMS_KEY_ID";
/// 通知先SNSトピックARNの環境変数名
pub const SNS_TOPIC_ARN_VAR: &str = "SNS_TOPIC_ARN";
/// 復号方式の環境変数名
pub const DECRYPTION_MODE_VAR: &str = "DECRYPTION_MODE";

/// 設定のエラー型
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("不正な環境変数の値です: {name}={value}")]
    InvalidEnvVar { name: String, value: String },
}

/// 復号方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecryptionMode {
    /// KMSで復号（キーID未設定または失敗時はモック反転）
    #[default]
    Kms,
    /// 常にモック反転
    Mock,
}

impl DecryptionMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "kms" => Some(Self::Kms),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }
}

/// Decryptor Lambda設定
///
/// 以下の環境変数から読み込む:
/// - KMS_KEY_ID: 復号と書き込み時のSSE-KMSに使うキーID（任意）
/// - SNS_TOPIC_ARN: 処理結果通知先SNSトピックARN（任意、未設定なら通知しない）
/// - DECRYPTION_MODE: `kms`（デフォルト）または`mock`
///
/// 空文字列は未設定として扱う。
#[derive(Debug, Clone, PartialEq)]
pub struct DecryptorConfig {
    decryption_mode: DecryptionMode,
    kms_key_id: Option<String>,
    sns_topic_arn: Option<String>,
}

impl DecryptorConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # エラー
    /// DECRYPTION_MODEに未知の値が設定されている場合はエラーを返す
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の変数取得関数から設定を読み込む
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let decryption_mode = match non_empty(DECRYPTION_MODE_VAR) {
            Some(value) => DecryptionMode::parse(&value).ok_or_else(|| ConfigError::InvalidEnvVar {
                name: DECRYPTION_MODE_VAR.to_string(),
                value,
            })?,
            None => DecryptionMode::default(),
        };

        Ok(Self {
            decryption_mode,
            kms_key_id: non_empty(KMS_KEY_ID_VAR),
            sns_topic_arn: non_empty(SNS_TOPIC_ARN_VAR),
        })
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(
        decryption_mode: DecryptionMode,
        kms_key_id: Option<String>,
        sns_topic_arn: Option<String>,
    ) -> Self {
        Self {
            decryption_mode,
            kms_key_id,
            sns_topic_arn,
        }
    }

    /// 復号方式を取得
    pub fn decryption_mode(&self) -> DecryptionMode {
        self.decryption_mode
    }

    /// KMSキーIDを取得
    pub fn kms_key_id(&self) -> Option<&str> {
        self.kms_key_id.as_deref()
    }

    /// 通知先SNSトピックARNを取得
    pub fn sns_topic_arn(&self) -> Option<&str> {
        self.sns_topic_arn.as_deref()
    }
}
