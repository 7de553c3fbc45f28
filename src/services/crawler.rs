/// User-agent fragments that identify crawlers and link unfurlers
const CRAWLER_MARKERS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "googlebot",
    "bingbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "facebook",
    "twitterbot",
    "linkedinbot",
];

pub struct CrawlerDetector;

impl CrawlerDetector {
    /// Case-insensitive substring match against known crawler markers
    pub fn is_crawler(user_agent: &str) -> bool {
        let ua = user_agent.to_ascii_lowercase();
        CRAWLER_MARKERS.iter().any(|marker| ua.contains(marker))
    }
}
