//! HTTP client wrapper: single attempt + bounded retry, producing one
//! [`RequestEvent`] per logical request.
mod client;
mod event;

pub use client::send;
pub use event::{ErrorKind, RequestEvent};
