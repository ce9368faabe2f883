//! Request body for POST/PUT operations.

use crate::base::neterror::NetError;
use bytes::Bytes;
use url::form_urlencoded;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request body for HTTP methods that send data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body (GET, HEAD, DELETE).
    #[default]
    Empty,
    /// Form fields, sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// Pre-encoded content sent verbatim. The caller sets the Content-Type.
    Raw(String),
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Raw(s)
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Raw(s.to_owned())
    }
}

impl From<Vec<(String, String)>> for RequestBody {
    fn from(pairs: Vec<(String, String)>) -> Self {
        RequestBody::Form(pairs)
    }
}

impl RequestBody {
    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Form(pairs) => pairs.is_empty(),
            RequestBody::Raw(s) => s.is_empty(),
        }
    }

    /// Merge form fields into the body. A raw body is discarded first.
    /// Existing keys are overwritten in place.
    pub fn merge_form<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if !matches!(self, RequestBody::Form(_)) {
            *self = RequestBody::Form(Vec::new());
        }
        if let RequestBody::Form(pairs) = self {
            for (key, value) in fields {
                let (key, value) = (key.into(), value.into());
                match pairs.iter_mut().find(|(k, _)| *k == key) {
                    Some(pair) => pair.1 = value,
                    None => pairs.push((key, value)),
                }
            }
        }
    }

    /// Merge an `a=1&b=2` string into the form fields.
    pub fn merge_form_str(&mut self, encoded: &str) -> Result<(), NetError> {
        if !encoded.contains('=') {
            return Err(NetError::InvalidArgument);
        }
        let fields: Vec<(String, String)> = form_urlencoded::parse(encoded.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if fields.is_empty() {
            return Err(NetError::InvalidArgument);
        }
        self.merge_form(fields);
        Ok(())
    }

    /// Replace the body with opaque content. Empty content is rejected.
    pub fn set_raw(&mut self, content: impl Into<String>) -> Result<(), NetError> {
        let content = content.into();
        if content.is_empty() {
            return Err(NetError::InvalidArgument);
        }
        *self = RequestBody::Raw(content);
        Ok(())
    }

    /// Wire bytes for this body.
    pub fn encode(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Form(pairs) => Bytes::from(
                form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs.iter())
                    .finish(),
            ),
            RequestBody::Raw(s) => Bytes::from(s.clone()),
        }
    }

    /// Content-Type implied by the body, if any.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Form(_) => Some(FORM_CONTENT_TYPE),
            _ => None,
        }
    }
}
