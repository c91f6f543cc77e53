//! Edge server library: static asset serving with a small in-memory
//! cache, plus a pass-through web proxy with same-origin link
//! rewriting.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod static_files;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
