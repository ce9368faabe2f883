//! Parsed HTTP response.

use bytes::Bytes;

/// Values recorded for one header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderEntry {
    Single(String),
    /// The name repeated (or is `set-cookie`); values in arrival order.
    Multiple(Vec<String>),
}

impl HeaderEntry {
    /// First value received for the name.
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderEntry::Single(v) => Some(v),
            HeaderEntry::Multiple(values) => values.first().map(String::as_str),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            HeaderEntry::Single(v) => std::slice::from_ref(v),
            HeaderEntry::Multiple(values) => values,
        };
        values.iter().map(String::as_str)
    }
}

/// Response headers keyed by lower-cased name, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(String, HeaderEntry)>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a header. The second and later occurrences of a name, and every
    /// `set-cookie`, are coalesced into an ordered list.
    pub fn append(&mut self, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim().to_string();

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, entry)) => match entry {
                HeaderEntry::Single(first) => {
                    let first = std::mem::take(first);
                    *entry = HeaderEntry::Multiple(vec![first, value]);
                }
                HeaderEntry::Multiple(values) => values.push(value),
            },
            None => {
                let entry = if name == "set-cookie" {
                    HeaderEntry::Multiple(vec![value])
                } else {
                    HeaderEntry::Single(value)
                };
                self.entries.push((name, entry));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderEntry> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, entry)| entry)
    }

    /// First value for `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(HeaderEntry::first)
    }

    /// All values for `name` (empty when absent).
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|entry| entry.values().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderEntry)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A decoded response: status, coalesced headers and the de-framed,
/// decompressed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    headers: ResponseHeaders,
    body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, headers: ResponseHeaders, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get the status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
