//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, prefix dispatch, middleware)
//!     → static_files or proxy responder (fallible)
//!     → error.rs (render HandlerError as the terminal response)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod server;

pub use error::HandlerError;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
