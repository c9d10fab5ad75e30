pub mod auth_service;
pub mod upload_service;

pub use auth_service::{AuthError, AuthService, AuthSession};
pub use upload_service::{PendingUpload, UploadError, UploadKind, UploadService, UploadedFile};
