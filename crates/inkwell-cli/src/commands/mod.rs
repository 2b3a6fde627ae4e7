//! Command handlers grouped by concern.

pub(crate) mod articles;
pub(crate) mod comments;
pub(crate) mod navigate;
pub(crate) mod session;
