/// Decryptor Lambda関数
///
/// EventBridge経由のS3 Object Createdイベントを受け取り、
/// raw/配下のオブジェクトを復号してdecrypted/配下に書き出す。
///
/// 設定とAWSクライアントはコールドスタート時に一度だけ構築し、
/// 以降のinvocationで共有する。
use std::sync::Arc;

use decryptor::application::ObjectTransformHandler;
use decryptor::infrastructure::{
    AwsKmsOps, AwsSnsOps, DecryptorConfig, S3ObjectStore, init_logging,
};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{error, info};

type Handler = ObjectTransformHandler<S3ObjectStore, AwsKmsOps, AwsSnsOps>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // 設定を環境変数から読み込み
    let config = match DecryptorConfig::from_env() {
        Ok(config) => {
            info!(
                decryption_mode = ?config.decryption_mode(),
                kms_key_configured = config.kms_key_id().is_some(),
                sns_topic_arn = config.sns_topic_arn().unwrap_or("(none)"),
                "Decryptor設定を読み込み"
            );
            config
        }
        Err(err) => {
            error!(error = %err, "Decryptor設定読み込み失敗");
            return Err(err.into());
        }
    };

    // 環境からAWS設定を読み込み（認証情報、リージョンなど）
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let handler: Arc<Handler> = Arc::new(ObjectTransformHandler::from_config(
        &config,
        S3ObjectStore::new(aws_sdk_s3::Client::new(&aws_config)),
        AwsKmsOps::new(aws_sdk_kms::Client::new(&aws_config)),
        AwsSnsOps::new(aws_sdk_sns::Client::new(&aws_config)),
    ));

    // Lambda関数を初期化して実行
    let func = service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move { handle(&handler, event).await }
    });
    lambda_runtime::run(func).await?;
    Ok(())
}

/// Lambda関数のメインハンドラー
///
/// 処理結果は常に`{statusCode, body}`として返し、エラーにはしない。
async fn handle(handler: &Handler, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let request_id = event.context.request_id.clone();
    let response = handler.handle(&event.payload).await;

    info!(
        request_id = %request_id,
        status_code = response.status_code,
        "invocation完了"
    );
    Ok(response.into_value())
}
