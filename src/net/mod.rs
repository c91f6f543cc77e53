//! Network layer subsystem.
//!
//! The listener itself is bound in `main` and handed to the HTTP
//! server; this module holds the TLS certificate loading that happens
//! before the bind when HTTPS is enabled.

pub mod tls;
