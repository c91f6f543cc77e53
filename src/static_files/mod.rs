//! Static file serving subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     public_dir/index.html, public_dir/404.html
//!         → cache.rs (read once, Option per logical key)
//!         → shared read-only via Arc
//!
//! Per request:
//!     request path
//!         → responder.rs (cache hit | sanitized disk read)
//!         → 200 + bytes, or HandlerError::NotFound
//! ```
//!
//! # Design Decisions
//! - Cache is populated before the listener starts and never refreshed
//! - Disabled caching means the cache is never consulted at all
//! - Unknown paths and traversal attempts both surface as 404

pub mod cache;
pub mod responder;

pub use cache::StaticCache;
