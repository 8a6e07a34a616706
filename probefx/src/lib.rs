// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    RequestOptions, build_headers, expand_output_path, parse_header_line, run_request,
    write_report,
};

// Re-export crawl functionality from probefx-core
pub use probefx_core::crawl::{
    CrawlOptions, execute_crawl, extract_url_path, generate_crawl_report,
};
