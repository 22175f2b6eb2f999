// Explicit process/request state: one-time asset registration and request context.

pub mod assets;
pub mod request;
