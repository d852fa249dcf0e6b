//! Streaming `multipart/form-data` serialization with async-first design.
//!
//! This crate provides:
//! - Multipart framing with boundaries, ordered part headers, preamble and epilogue (RFC 2046)
//! - Form field serialization with `Content-Disposition` synthesis (RFC 7578)
//! - Random boundary generation and `Content-Type` header values
//!
//! Part bodies may be fully materialized or streamed from any async reader or
//! chunk stream; they are forwarded to the output sink without being buffered.
//! All I/O operations are async-first using tokio.

pub mod bytes_convertible;
pub mod error;
pub mod formdata;
pub mod grammar;
pub mod multipart;

// Re-export commonly used types
pub use bytes_convertible::BytesConvertible;
pub use error::{Error, Result};
pub use formdata::Field;
pub use multipart::{generate_content_type, Body, Boundary, HeaderMap, Part, SerializerState};
