use crate::models::{ListingBatch, RawListing};
use crate::parser;
use crate::scraper::{ListingSource, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use crate::tui::ScraperTUI;
use crate::utils::OutputFormat;
use crate::{debug_eprintln, debug_println};
use std::fmt;

pub const DEFAULT_OUTPUT_FILE: &str = "marktplaats_cars.csv";
pub const DEFAULT_TOTAL_PAGES: usize = 5;

#[derive(Debug, Clone)]
pub struct ScrapingOptions {
    pub output_file: String,
    pub total_pages: usize,
    pub page_size: usize,
    pub timeout_secs: u64,
    pub format: OutputFormat,
}

impl Default for ScrapingOptions {
    fn default() -> Self {
        Self {
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            total_pages: DEFAULT_TOTAL_PAGES,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            format: OutputFormat::Csv,
        }
    }
}

/// What a single page fetch produced.
#[derive(Debug)]
pub enum PageOutcome {
    Listings(Vec<RawListing>),
    Empty,
    Failed(anyhow::Error),
}

impl PageOutcome {
    pub fn from_fetch(result: anyhow::Result<Vec<RawListing>>) -> Self {
        match result {
            Ok(listings) if listings.is_empty() => PageOutcome::Empty,
            Ok(listings) => PageOutcome::Listings(listings),
            Err(e) => PageOutcome::Failed(e),
        }
    }
}

/// Why the page loop ended. Page indices are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    PageLimit,
    EmptyPage(usize),
    FetchFailed { page: usize, message: String },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::PageLimit => write!(f, "page limit reached"),
            StopReason::EmptyPage(page) => write!(f, "page {} was empty", page + 1),
            StopReason::FetchFailed { page, message } => {
                write!(f, "page {} failed: {}", page + 1, message)
            }
        }
    }
}

#[derive(Debug)]
pub struct ScrapingResult {
    pub listings: ListingBatch,
    pub pages_fetched: usize,
    pub stop_reason: StopReason,
}

/// Walks pages `0..total_pages` in order and stops at the first empty or failed page.
/// Never fails: whatever was collected before the stop is returned.
pub fn run_scraper_with_options<S: ListingSource>(
    source: &S,
    options: &ScrapingOptions,
    mut tui: Option<&mut ScraperTUI>,
) -> ScrapingResult {
    let mut listings = ListingBatch::new();
    let mut pages_fetched = 0;
    let mut stop_reason = StopReason::PageLimit;

    if let Some(tui) = tui.as_mut() {
        tui.start_fetching(source.name(), options.total_pages).ok();
    } else {
        println!("{} Car Scraper", source.name());
        println!("{}", "=".repeat(source.name().len() + 12));
    }

    for page in 0..options.total_pages {
        debug_println!("Fetching page {} of {}", page + 1, options.total_pages);

        match PageOutcome::from_fetch(source.fetch_page(page, options.page_size)) {
            PageOutcome::Listings(raw) => {
                pages_fetched += 1;
                listings.extend(raw.iter().map(parser::normalize_listing));

                if let Some(tui) = tui.as_mut() {
                    tui.update_page_progress(page + 1, listings.len()).ok();
                } else {
                    println!("Page {}: {} listings ({} total)", page + 1, raw.len(), listings.len());
                }
            }
            PageOutcome::Empty => {
                pages_fetched += 1;
                if let Some(tui) = tui.as_mut() {
                    tui.page_empty(page).ok();
                } else {
                    println!("No more listings found on page {}, stopping pagination", page + 1);
                }
                stop_reason = StopReason::EmptyPage(page);
                break;
            }
            PageOutcome::Failed(e) => {
                debug_eprintln!("Fetch error on page {}: {:?}", page + 1, e);
                if let Some(tui) = tui.as_mut() {
                    tui.page_failed(page, &format!("{:#}", e)).ok();
                } else {
                    eprintln!("Error fetching page {}: {:#}", page + 1, e);
                }
                stop_reason = StopReason::FetchFailed {
                    page,
                    message: format!("{:#}", e),
                };
                break;
            }
        }
    }

    if let Some(tui) = tui.as_mut() {
        tui.finish_fetching(pages_fetched, listings.len()).ok();
    }

    ScrapingResult {
        listings,
        pages_fetched,
        stop_reason,
    }
}
