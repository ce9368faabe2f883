//! HTTP/1.1 request composition and response decoding.

pub mod chunked;
pub mod method;
pub mod orderedheaders;
pub mod requestbody;
pub mod requestbuilder;
pub mod response;
pub mod responseparser;
pub mod urlparts;

// Re-exports for convenience
pub use method::Method;
pub use orderedheaders::OrderedHeaderMap;
pub use requestbody::RequestBody;
pub use requestbuilder::{PreparedRequest, RequestBuilder};
pub use response::{HeaderEntry, HttpResponse, ResponseHeaders};
pub use urlparts::{Scheme, UrlParts};
