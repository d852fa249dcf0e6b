//! multipart/form-data serializer.
//!
//! Turns [`Field`]s into parts carrying a `Content-Disposition` header and
//! writes them through a [`multipart::Serializer`](crate::multipart::Serializer).

use crate::bytes_convertible::BytesConvertible;
use crate::error::{Error, Result};
use crate::formdata::Field;
use crate::multipart;
use bytes::Bytes;
use tokio::io::AsyncWrite;

/// Serializes form fields as `multipart/form-data`.
///
/// The underlying multipart serializer is exposed for the preamble, the
/// closing boundary and the epilogue.
pub struct Serializer<W> {
    multipart: multipart::Serializer<W>,
}

impl<W> Serializer<W> {
    pub fn new(multipart: multipart::Serializer<W>) -> Self {
        Self { multipart }
    }

    /// Returns the Content-Type header value `multipart/form-data; boundary=<boundary>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_formdata::formdata::Serializer;
    ///
    /// let value = Serializer::<Vec<u8>>::generate_content_type("XYZ").unwrap();
    /// assert_eq!(&value[..], b"multipart/form-data; boundary=XYZ");
    /// ```
    pub fn generate_content_type<B: BytesConvertible + ?Sized>(boundary: &B) -> Result<Bytes> {
        multipart::generate_content_type(boundary)
    }

    pub fn multipart(&self) -> &multipart::Serializer<W> {
        &self.multipart
    }

    pub fn multipart_mut(&mut self) -> &mut multipart::Serializer<W> {
        &mut self.multipart
    }

    pub fn into_multipart(self) -> multipart::Serializer<W> {
        self.multipart
    }
}

impl<W: AsyncWrite + Unpin> Serializer<W> {
    /// Serializes one field.
    ///
    /// May be called any number of times. Once every field is written,
    /// [`finish`](Self::finish) must be called to add the closing boundary.
    /// The field is consumed: its part gains a `Content-Disposition` header
    /// (replacing any existing one) and is moved into the multipart serializer.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_formdata::formdata::{Field, Serializer};
    /// use tokio_formdata::multipart::{self, Boundary};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut output: Vec<u8> = Vec::new();
    /// let mut form = Serializer::new(multipart::Serializer::new(&mut output, Boundary::new("XYZ")?));
    /// form.serialize(Field::file("file", "a.txt", "hi")).await?;
    /// form.finish().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn serialize(&mut self, field: Field) -> Result<()> {
        if field.name.is_empty() {
            return Err(Error::encoding("form field name is empty"));
        }

        tracing::debug!(
            name = %field.name,
            is_file = field.filename.is_some(),
            "serializing form field"
        );

        self.multipart.serialize_part(field.into_part()).await
    }

    /// Writes the closing boundary. Shorthand for `multipart_mut().finish()`.
    pub async fn finish(&mut self) -> Result<()> {
        self.multipart.finish().await
    }
}
