//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): network error codes, numbered after Chromium's
//!   `net_error_list.h` where an equivalent exists
//! - [`IoResultExt`](context::IoResultExt): names the request target or looked-up host on IO errors

pub mod context;
pub mod neterror;

#[cfg(test)]
mod tests;
