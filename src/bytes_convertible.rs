//! Conversion of boundary and header inputs into raw bytes.

use crate::error::{Error, Result};
use bytes::Bytes;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// A value that can be rendered as the bytes written to the wire.
///
/// Conversion fails with [`Error::Encoding`] when the value has no faithful
/// byte form (for example a non-UTF-8 OS string).
pub trait BytesConvertible {
    /// Returns the byte form of this value.
    fn make_bytes(&self) -> Result<Bytes>;
}

impl BytesConvertible for str {
    fn make_bytes(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }
}

impl BytesConvertible for String {
    fn make_bytes(&self) -> Result<Bytes> {
        self.as_str().make_bytes()
    }
}

impl BytesConvertible for [u8] {
    fn make_bytes(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(self))
    }
}

impl<const N: usize> BytesConvertible for [u8; N] {
    fn make_bytes(&self) -> Result<Bytes> {
        self.as_slice().make_bytes()
    }
}

impl BytesConvertible for Vec<u8> {
    fn make_bytes(&self) -> Result<Bytes> {
        self.as_slice().make_bytes()
    }
}

impl BytesConvertible for Bytes {
    fn make_bytes(&self) -> Result<Bytes> {
        Ok(self.clone())
    }
}

impl BytesConvertible for OsStr {
    fn make_bytes(&self) -> Result<Bytes> {
        match self.to_str() {
            Some(s) => s.make_bytes(),
            None => Err(Error::encoding(format!(
                "{:?} is not valid UTF-8",
                self
            ))),
        }
    }
}

impl BytesConvertible for OsString {
    fn make_bytes(&self) -> Result<Bytes> {
        self.as_os_str().make_bytes()
    }
}

impl BytesConvertible for Path {
    fn make_bytes(&self) -> Result<Bytes> {
        self.as_os_str().make_bytes()
    }
}

impl BytesConvertible for PathBuf {
    fn make_bytes(&self) -> Result<Bytes> {
        self.as_os_str().make_bytes()
    }
}

impl<T: BytesConvertible + ?Sized> BytesConvertible for &T {
    fn make_bytes(&self) -> Result<Bytes> {
        (**self).make_bytes()
    }
}
