pub mod http;
pub mod sanitize;
