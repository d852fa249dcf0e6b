//! Form data serialization (RFC 7578).

pub mod field;
pub mod serializer;

pub use field::Field;
pub use serializer::Serializer;
