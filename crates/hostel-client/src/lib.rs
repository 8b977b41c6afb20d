//! Client-side core of the hostel management dashboard: session store,
//! REST API wrapper, per-slot upload manager, and the renewal-form
//! workflow that role-specific views compose.

pub mod api;
pub mod error;
pub mod renewal;
pub mod session;
pub mod upload;

pub use api::ApiClient;
pub use error::{ClientError, Result};
pub use renewal::{PendingForm, RenewalWorkflow, StatusFilter, SubmitPolicy};
pub use session::{Session, SessionStore};
pub use upload::UploadManager;
