//! Multipart framing: boundaries, parts and the part serializer.

pub mod boundary;
pub mod part;
pub mod serializer;

pub use boundary::Boundary;
pub use part::{Body, HeaderMap, Part};
pub use serializer::{generate_content_type, Serializer, SerializerState};
