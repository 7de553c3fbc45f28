pub mod allowlist;
pub mod crawler;
pub mod link;
pub mod shortener;

pub use allowlist::DomainPolicy;
pub use crawler::CrawlerDetector;
pub use link::{CrawlerView, GeneratedLink, LinkService};
pub use shortener::ShortCodeService;
