//! Multipart parts: ordered headers plus a body.

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;
use std::io;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// An ordered header map.
///
/// Headers are written in insertion order. Setting a name that is already
/// present replaces its value in place. Names are compared byte for byte;
/// callers own any case normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, returning the previous value if there was one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// The content of a part.
///
/// Materialized bodies are written in one go; reader and stream bodies are
/// forwarded chunk by chunk as they are produced.
pub enum Body {
    /// Fully materialized content.
    Bytes(Bytes),
    /// Content pulled incrementally from an async chunk stream.
    Stream(BoxStream<'static, io::Result<Bytes>>),
}

impl Body {
    /// An empty body.
    pub fn empty() -> Self {
        Body::Bytes(Bytes::new())
    }

    /// Wraps an async reader; it is read in fixed-size chunks while the part is written.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Body::Stream(ReaderStream::with_capacity(reader, READ_CHUNK_SIZE).boxed())
    }

    /// Wraps a stream of byte chunks.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Body::Stream(stream.boxed())
    }

    /// Returns the body length when it is known without consuming it.
    pub fn len_hint(&self) -> Option<usize> {
        match self {
            Body::Bytes(b) => Some(b.len()),
            Body::Stream(_) => None,
        }
    }

    pub(crate) fn into_stream(self) -> BoxStream<'static, io::Result<Bytes>> {
        match self {
            Body::Bytes(b) if b.is_empty() => stream::empty().boxed(),
            Body::Bytes(b) => stream::once(async move { Ok(b) }).boxed(),
            Body::Stream(s) => s,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Bytes(b)
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(v))
    }
}

impl From<&'static [u8]> for Body {
    fn from(s: &'static [u8]) -> Self {
        Body::Bytes(Bytes::from_static(s))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

/// One section of a multipart body.
#[derive(Debug, Default)]
pub struct Part {
    pub headers: HeaderMap,
    pub body: Body,
}

impl Part {
    /// Creates a part with no headers.
    pub fn new(body: impl Into<Body>) -> Self {
        Self {
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Creates a part with the given headers.
    pub fn with_headers(headers: HeaderMap, body: impl Into<Body>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Sets a header and returns the part, for chaining.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }
}
