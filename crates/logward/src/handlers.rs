//! Built-in [`Handler`](crate::Handler) implementations.

pub mod json;
pub mod otel;
pub mod test_util;
pub mod text;
