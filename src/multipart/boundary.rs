//! Multipart boundary tokens.

use crate::bytes_convertible::BytesConvertible;
use crate::error::{Error, Result};
use crate::grammar::is_boundary_char;
use bytes::Bytes;
use std::fmt;

/// Longest boundary permitted by RFC 2046.
pub const MAX_BOUNDARY_LEN: usize = 70;

const RANDOM_BYTES: usize = 30;
const LOWER_HEX: &[u8] = b"0123456789abcdef";

/// The delimiter placed between the parts of a multipart body.
///
/// A boundary is opaque to the serializer; it must never occur inside a
/// part's body, which is up to whoever picks it. [`Boundary::generate`]
/// produces 240 random bits, making an accidental collision negligible.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Boundary(Bytes);

impl Boundary {
    /// Creates a boundary from a caller-supplied value.
    ///
    /// The value must be 1-70 bytes long, made of RFC 2046 `bchars`, and must
    /// not end with a space.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_formdata::multipart::Boundary;
    ///
    /// let boundary = Boundary::new("XYZ").unwrap();
    /// assert_eq!(boundary.as_bytes(), b"XYZ");
    /// assert!(Boundary::new("").is_err());
    /// ```
    pub fn new<B: BytesConvertible + ?Sized>(value: &B) -> Result<Self> {
        let bytes = value.make_bytes()?;

        if bytes.is_empty() || bytes.len() > MAX_BOUNDARY_LEN {
            return Err(Error::encoding(format!(
                "invalid boundary length: {}",
                bytes.len()
            )));
        }

        if let Some(b) = bytes.iter().copied().find(|&b| !is_boundary_char(b)) {
            return Err(Error::encoding(format!(
                "invalid boundary byte: {:#04x}",
                b
            )));
        }

        if bytes.ends_with(b" ") {
            return Err(Error::encoding("boundary must not end with a space"));
        }

        Ok(Self(bytes))
    }

    /// Generates a random boundary of 60 lowercase hex characters.
    pub fn generate() -> Result<Self> {
        let mut buf = [0u8; RANDOM_BYTES];
        getrandom::getrandom(&mut buf).map_err(|e| Error::BoundaryGeneration(e.to_string()))?;

        let mut hex = Vec::with_capacity(RANDOM_BYTES * 2);
        for b in buf {
            hex.push(LOWER_HEX[(b >> 4) as usize]);
            hex.push(LOWER_HEX[(b & 0x0f) as usize]);
        }

        Ok(Self(Bytes::from(hex)))
    }

    /// Returns the raw boundary bytes, without the leading dashes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the boundary length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reports whether the boundary is empty, which validation never allows.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reports whether `body` contains a delimiter line for this boundary.
    ///
    /// Useful for callers that pick their own boundary and want to check a
    /// materialized body before sending it.
    pub fn occurs_in(&self, body: &[u8]) -> bool {
        let mut needle = Vec::with_capacity(self.0.len() + 4);
        needle.extend_from_slice(b"\r\n--");
        needle.extend_from_slice(&self.0);

        let starts_with_delimiter = body.starts_with(b"--") && body[2..].starts_with(&self.0);
        starts_with_delimiter || body.windows(needle.len()).any(|w| w == needle.as_slice())
    }
}

impl BytesConvertible for Boundary {
    fn make_bytes(&self) -> Result<Bytes> {
        Ok(self.0.clone())
    }
}

impl AsRef<[u8]> for Boundary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Boundary({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
