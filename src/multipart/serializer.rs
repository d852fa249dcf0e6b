//! Multipart framing serializer.
//!
//! Writes RFC 2046 / RFC 7578 framing around parts with async I/O.

use crate::bytes_convertible::BytesConvertible;
use crate::error::{Error, Result};
use crate::grammar::{is_line_breaking, is_token};
use crate::multipart::{Boundary, HeaderMap, Part};
use bytes::Bytes;
use futures::TryStreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

const CONTENT_TYPE_PREFIX: &[u8] = b"multipart/form-data; boundary=";

/// Where a [`Serializer`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerState {
    /// Nothing but (optionally) a preamble has been written.
    NotStarted,
    /// At least one part has been written.
    Active,
    /// The closing boundary has been written.
    Finished,
}

/// A multipart framing serializer.
///
/// Owns the boundary and the output sink for its whole lifetime. Parts are
/// written one at a time and bodies are streamed straight to the sink.
pub struct Serializer<W> {
    writer: W,
    boundary: Boundary,
    state: SerializerState,
    poisoned: bool,
}

impl<W: AsyncWrite + Unpin> Serializer<W> {
    /// Creates a serializer that frames parts with `boundary`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_formdata::multipart::{Boundary, Part, Serializer};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut output: Vec<u8> = Vec::new();
    /// let mut serializer = Serializer::new(&mut output, Boundary::new("XYZ")?);
    /// serializer
    ///     .serialize_part(Part::new("hi").header("Content-Type", "text/plain"))
    ///     .await?;
    /// serializer.finish().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(writer: W, boundary: Boundary) -> Self {
        Self {
            writer,
            boundary,
            state: SerializerState::NotStarted,
            poisoned: false,
        }
    }

    /// Creates a serializer with a freshly generated random boundary.
    pub fn with_random_boundary(writer: W) -> Result<Self> {
        Ok(Self::new(writer, Boundary::generate()?))
    }

    /// Writes raw bytes ahead of the first boundary line.
    ///
    /// Only legal before any part has been written. Does not change state,
    /// so it may be called several times.
    pub async fn serialize_preamble(&mut self, preamble: &[u8]) -> Result<()> {
        self.check_usable("serialize preamble")?;
        if self.state != SerializerState::NotStarted {
            return Err(Error::protocol(format!(
                "cannot serialize preamble in state {:?}",
                self.state
            )));
        }

        self.write(preamble).await
    }

    /// Writes one complete part: delimiter line, headers, blank line, body and CRLF.
    ///
    /// Header names must be tokens and values must not contain CR, LF or NUL;
    /// an invalid header is reported before anything of the part is written.
    pub async fn serialize_part(&mut self, part: Part) -> Result<()> {
        self.check_usable("serialize part")?;
        if self.state == SerializerState::Finished {
            return Err(Error::protocol("cannot serialize part after finish"));
        }

        let head = self.encode_head(&part.headers)?;

        tracing::debug!(
            headers = part.headers.len(),
            head_len = head.len(),
            body_len = ?part.body.len_hint(),
            "serializing multipart part"
        );

        self.state = SerializerState::Active;
        self.write(&head).await?;

        let mut body = part.body.into_stream();
        let mut written = 0usize;
        loop {
            let chunk = match body.try_next().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    self.poisoned = true;
                    return Err(Error::Io(e));
                }
            };
            tracing::trace!(chunk_len = chunk.len(), "forwarding body chunk");
            written += chunk.len();
            self.write(&chunk).await?;
        }

        tracing::trace!(body_written = written, "part body complete");
        self.write(b"\r\n").await
    }

    /// Writes the closing boundary and flushes the sink.
    ///
    /// May be called exactly once, with or without parts written.
    pub async fn finish(&mut self) -> Result<()> {
        self.check_usable("finish")?;
        if self.state == SerializerState::Finished {
            return Err(Error::protocol("finish called twice"));
        }

        let mut line = Vec::with_capacity(self.boundary.len() + 6);
        line.extend_from_slice(b"--");
        line.extend_from_slice(self.boundary.as_bytes());
        line.extend_from_slice(b"--\r\n");

        let parts_written = self.state == SerializerState::Active;
        tracing::debug!(parts_written, "finishing multipart body");

        self.state = SerializerState::Finished;
        self.write(&line).await?;
        self.flush().await
    }

    /// Writes raw trailing bytes after the closing boundary.
    pub async fn serialize_epilogue(&mut self, epilogue: &[u8]) -> Result<()> {
        self.check_usable("serialize epilogue")?;
        if self.state != SerializerState::Finished {
            return Err(Error::protocol(format!(
                "cannot serialize epilogue in state {:?}",
                self.state
            )));
        }

        self.write(epilogue).await?;
        self.flush().await
    }

    /// Returns the Content-Type header value for this serializer's boundary.
    pub fn content_type(&self) -> Bytes {
        content_type_for(self.boundary.as_bytes())
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.writer.write_all(bytes).await {
            self.poisoned = true;
            return Err(Error::Io(e));
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if let Err(e) = self.writer.flush().await {
            self.poisoned = true;
            return Err(Error::Io(e));
        }
        Ok(())
    }
}

impl<W> Serializer<W> {
    /// Returns the Content-Type header value `multipart/form-data; boundary=<boundary>`.
    ///
    /// Pure; independent of any serializer instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_formdata::multipart::Serializer;
    ///
    /// let value = Serializer::<Vec<u8>>::generate_content_type("XYZ").unwrap();
    /// assert_eq!(&value[..], b"multipart/form-data; boundary=XYZ");
    /// ```
    pub fn generate_content_type<B: BytesConvertible + ?Sized>(boundary: &B) -> Result<Bytes> {
        generate_content_type(boundary)
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn state(&self) -> SerializerState {
        self.state
    }

    /// Reports whether a sink failure has made this serializer unusable.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Returns the sink. Writing to it directly will corrupt the framing.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn check_usable(&self, op: &str) -> Result<()> {
        if self.poisoned {
            return Err(Error::protocol(format!(
                "cannot {} after a failed write",
                op
            )));
        }
        Ok(())
    }

    /// Builds the delimiter line and header block for one part.
    fn encode_head(&self, headers: &HeaderMap) -> Result<Vec<u8>> {
        let mut head = Vec::with_capacity(self.boundary.len() + 6 + headers.len() * 64);
        head.extend_from_slice(b"--");
        head.extend_from_slice(self.boundary.as_bytes());
        head.extend_from_slice(b"\r\n");

        for (name, value) in headers.iter() {
            if !is_token(name) {
                return Err(Error::encoding(format!("invalid header name: {:?}", name)));
            }
            if value.bytes().any(is_line_breaking) {
                return Err(Error::encoding(format!(
                    "header {} has a value containing CR, LF or NUL",
                    name
                )));
            }

            head.extend_from_slice(name.as_bytes());
            head.extend_from_slice(b": ");
            head.extend_from_slice(value.as_bytes());
            head.extend_from_slice(b"\r\n");
        }

        head.extend_from_slice(b"\r\n");
        Ok(head)
    }
}

/// Returns the Content-Type header value `multipart/form-data; boundary=<boundary>`.
///
/// The boundary is validated as by [`Boundary::new`], so the value is always ASCII.
pub fn generate_content_type<B: BytesConvertible + ?Sized>(boundary: &B) -> Result<Bytes> {
    let boundary = Boundary::new(boundary)?;
    Ok(content_type_for(boundary.as_bytes()))
}

fn content_type_for(boundary: &[u8]) -> Bytes {
    let mut value = Vec::with_capacity(CONTENT_TYPE_PREFIX.len() + boundary.len());
    value.extend_from_slice(CONTENT_TYPE_PREFIX);
    value.extend_from_slice(boundary);
    Bytes::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::Body;
    use futures::stream;
    use std::io;

    fn serializer(output: &mut Vec<u8>) -> Serializer<&mut Vec<u8>> {
        Serializer::new(output, Boundary::new("XYZ").unwrap())
    }

    #[tokio::test]
    async fn test_single_part() {
        let mut output = Vec::new();
        let mut s = serializer(&mut output);

        s.serialize_part(Part::new("hi").header("Content-Type", "text/plain"))
            .await
            .unwrap();
        s.finish().await.unwrap();

        assert_eq!(
            output,
            b"--XYZ\r\nContent-Type: text/plain\r\n\r\nhi\r\n--XYZ--\r\n"
        );
    }

    #[tokio::test]
    async fn test_empty_body_finish() {
        let mut output = Vec::new();
        let mut s = serializer(&mut output);

        assert_eq!(s.state(), SerializerState::NotStarted);
        s.finish().await.unwrap();
        assert_eq!(s.state(), SerializerState::Finished);

        assert_eq!(output, b"--XYZ--\r\n");
    }

    #[tokio::test]
    async fn test_part_without_headers() {
        let mut output = Vec::new();
        let mut s = serializer(&mut output);

        s.serialize_part(Part::new(Body::empty())).await.unwrap();
        s.finish().await.unwrap();

        assert_eq!(output, b"--XYZ\r\n\r\n\r\n--XYZ--\r\n");
    }

    #[tokio::test]
    async fn test_preamble_and_epilogue() {
        let mut output = Vec::new();
        let mut s = serializer(&mut output);

        s.serialize_preamble(b"preamble\r\n").await.unwrap();
        s.serialize_preamble(b"more\r\n").await.unwrap();
        assert_eq!(s.state(), SerializerState::NotStarted);

        s.serialize_part(Part::new("a")).await.unwrap();
        assert_eq!(s.state(), SerializerState::Active);
        assert!(matches!(
            s.serialize_preamble(b"late").await,
            Err(Error::ProtocolViolation(_))
        ));

        assert!(matches!(
            s.serialize_epilogue(b"early").await,
            Err(Error::ProtocolViolation(_))
        ));

        s.finish().await.unwrap();
        s.serialize_epilogue(b"bye").await.unwrap();

        assert_eq!(
            output,
            b"preamble\r\nmore\r\n--XYZ\r\n\r\na\r\n--XYZ--\r\nbye"
        );
    }

    #[tokio::test]
    async fn test_operations_after_finish_fail() {
        let mut output = Vec::new();
        let mut s = serializer(&mut output);
        s.finish().await.unwrap();

        assert!(matches!(
            s.serialize_part(Part::new("x")).await,
            Err(Error::ProtocolViolation(_))
        ));
        assert!(matches!(
            s.serialize_preamble(b"x").await,
            Err(Error::ProtocolViolation(_))
        ));
        assert!(matches!(s.finish().await, Err(Error::ProtocolViolation(_))));

        assert_eq!(output, b"--XYZ--\r\n");
    }

    #[tokio::test]
    async fn test_streamed_body() {
        let chunks = vec![
            Ok(Bytes::from_static(b"one,")),
            Ok(Bytes::from_static(b"two,")),
            Ok(Bytes::from_static(b"three")),
        ];

        let mut output = Vec::new();
        let mut s = serializer(&mut output);
        s.serialize_part(Part::new(Body::from_stream(stream::iter(chunks))))
            .await
            .unwrap();
        s.finish().await.unwrap();

        assert_eq!(output, b"--XYZ\r\n\r\none,two,three\r\n--XYZ--\r\n");
    }

    #[tokio::test]
    async fn test_invalid_header_writes_nothing() {
        let mut output = Vec::new();
        let mut s = serializer(&mut output);

        s.serialize_part(Part::new("ok")).await.unwrap();

        let bad_value = Part::new("x").header("X-Ok", "fine").header("X-Bad", "a\r\nb");
        assert!(matches!(
            s.serialize_part(bad_value).await,
            Err(Error::Encoding(_))
        ));

        let bad_name = Part::new("x").header("Bad Name", "v");
        assert!(matches!(
            s.serialize_part(bad_name).await,
            Err(Error::Encoding(_))
        ));

        assert!(!s.is_poisoned());
        s.finish().await.unwrap();

        assert_eq!(output, b"--XYZ\r\n\r\nok\r\n--XYZ--\r\n");
    }

    #[tokio::test]
    async fn test_body_source_failure_poisons() {
        let chunks = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
        ];

        let mut output = Vec::new();
        let mut s = serializer(&mut output);

        let err = s
            .serialize_part(Part::new(Body::from_stream(stream::iter(chunks))))
            .await
            .unwrap_err();
        assert!(err.is_sink_failure());
        assert!(s.is_poisoned());

        assert!(matches!(s.finish().await, Err(Error::ProtocolViolation(_))));
    }

    #[tokio::test]
    async fn test_sink_failure_poisons() {
        let sink = tokio_test::io::Builder::new()
            .write(b"--XYZ\r\n\r\n")
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            .build();
        let mut s = Serializer::new(sink, Boundary::new("XYZ").unwrap());

        let err = s.serialize_part(Part::new("hi")).await.unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert!(s.is_poisoned());
        assert!(matches!(
            s.serialize_part(Part::new("again")).await,
            Err(Error::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_generate_content_type() {
        let a = Serializer::<Vec<u8>>::generate_content_type("XYZ").unwrap();
        let b = Serializer::<Vec<u8>>::generate_content_type("XYZ").unwrap();

        assert_eq!(&a[..], b"multipart/form-data; boundary=XYZ");
        assert_eq!(a, b);

        let s = Serializer::new(Vec::<u8>::new(), Boundary::new("XYZ").unwrap());
        assert_eq!(s.content_type(), a);
        assert_eq!(generate_content_type(s.boundary()).unwrap(), a);
        assert!(a.is_ascii());
    }

    #[test]
    fn test_generate_content_type_rejects_bad_boundary() {
        assert!(matches!(
            generate_content_type("a\r\nX-Injected: 1"),
            Err(Error::Encoding(_))
        ));
        assert!(matches!(
            generate_content_type(&b"a b;\xff\x01"[..]),
            Err(Error::Encoding(_))
        ));
        assert!(matches!(
            generate_content_type("grüße"),
            Err(Error::Encoding(_))
        ));
    }
}
