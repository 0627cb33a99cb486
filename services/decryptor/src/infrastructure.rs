// Infrastructure layer modules
pub mod config;
pub mod kms_ops;
pub mod logging;
pub mod object_store;
pub mod sns_ops;

// Re-exports
pub use config::{ConfigError, DecryptionMode, DecryptorConfig};
pub use kms_ops::{AwsKmsOps, KmsOps, KmsOpsError};
pub use logging::init_logging;
pub use object_store::{ObjectStore, ObjectStoreError, PutEncryption, S3ObjectStore};
pub use sns_ops::{AwsSnsOps, SnsOps, SnsOpsError};
