pub mod http;
pub mod resolver;

pub use http::*;
pub use resolver::*;
