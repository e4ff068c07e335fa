pub mod catalog;
pub mod client;
pub mod error;
pub mod payload;
pub mod presenter;
pub mod query;
pub mod session;
pub mod tools;

// Re-export the pieces every dashboard needs
pub use catalog::{get_catalog, Catalog, Method, ResourceKind, ResourceSchema};
pub use client::{ApiClient, ApiRequest, DEFAULT_BASE_URL};
pub use error::{ApiError, SchemaError, SessionError};
pub use presenter::{present, Presentation};
pub use session::{Credentials, Session};
