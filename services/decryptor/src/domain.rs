// Domain layer modules
pub mod decryption;
pub mod handler_response;
pub mod notification_message;
pub mod object_key;
pub mod upload_event;

// Re-exports
pub use decryption::mock_reverse;
pub use handler_response::HandlerResponse;
pub use notification_message::{NotificationMessage, NotificationStatus, ObjectLocation};
pub use object_key::{destination_key, is_raw_key};
pub use upload_event::{EventValidationError, UploadEvent};
