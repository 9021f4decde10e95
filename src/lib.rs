pub mod common_scraper;
pub mod debug;
pub mod models;
pub mod parser;
pub mod scraper;
pub mod tui;
pub mod utils;
