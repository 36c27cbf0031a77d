pub mod http;
pub mod service;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use http::HttpRagClient;
pub use service::RagService;
