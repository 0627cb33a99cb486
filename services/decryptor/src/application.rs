// アプリケーション層モジュール
pub mod decryption_strategy;
pub mod notification_emitter;
pub mod transform_handler;

// 再エクスポート
pub use decryption_strategy::{Decrypted, DecryptionMethod, DecryptionStrategy};
pub use notification_emitter::{NotificationEmitter, NotifyError, NotifyOutcome};
pub use transform_handler::{ObjectTransformHandler, ProcessingError, UNKNOWN_SOURCE};
