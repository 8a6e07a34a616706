pub mod client;
pub mod crawler;
pub mod error;
pub mod normalize;
pub mod result;
pub mod transaction;

pub use client::TransactionClient;
pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use result::CrawlResult;
pub use transaction::{HttpHeaders, HttpMethod, HttpResponse, HttpTransaction};
