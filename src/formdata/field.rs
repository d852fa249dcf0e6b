//! Form fields.

use crate::grammar::escape_quotes;
use crate::multipart::{Body, Part};

/// A named form value mapped to exactly one multipart part.
///
/// `filename` is set only for file uploads. The part's headers are kept, and
/// `Content-Disposition` is added (or replaced) when the field is serialized.
#[derive(Debug)]
pub struct Field {
    pub name: String,
    pub filename: Option<String>,
    pub part: Part,
}

impl Field {
    /// Creates a field from an existing part.
    pub fn new(name: impl Into<String>, filename: Option<String>, part: Part) -> Self {
        Self {
            name: name.into(),
            filename,
            part,
        }
    }

    /// A plain text field.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_formdata::formdata::Field;
    ///
    /// let field = Field::text("username", "john_doe");
    /// assert_eq!(field.content_disposition(), "form-data; name=\"username\"");
    /// ```
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, None, Part::new(value.into()))
    }

    /// A file upload field.
    pub fn file(name: impl Into<String>, filename: impl Into<String>, body: impl Into<Body>) -> Self {
        Self::new(name, Some(filename.into()), Part::new(body))
    }

    /// Sets the part's `Content-Type` header.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.part.headers.insert("Content-Type", content_type);
        self
    }

    /// Builds the `Content-Disposition` value for this field.
    ///
    /// Quotes and backslashes in the name or filename are backslash-escaped.
    pub fn content_disposition(&self) -> String {
        let mut value = format!("form-data; name=\"{}\"", escape_quotes(&self.name));
        if let Some(filename) = &self.filename {
            value.push_str("; filename=\"");
            value.push_str(&escape_quotes(filename));
            value.push('"');
        }
        value
    }

    /// Writes the disposition header into the part and hands the part back.
    pub(crate) fn into_part(mut self) -> Part {
        let disposition = self.content_disposition();
        self.part.headers.insert("Content-Disposition", disposition);
        self.part
    }
}
