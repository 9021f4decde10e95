use anyhow::Result;
use clap::Parser;
use autofinder::common_scraper::{
    run_scraper_with_options, ScrapingOptions, DEFAULT_OUTPUT_FILE, DEFAULT_TOTAL_PAGES,
};
use autofinder::scraper::{MarktplaatsClient, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use autofinder::tui::ScraperTUI;
use autofinder::utils::{self, OutputFormat};
use autofinder::debug;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Autofinder - Car listing scraper for Marktplaats.nl")]
struct Args {
    /// Path to output CSV file
    #[clap(short, long, env = "AUTOFINDER_OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    output: String,

    /// Maximum number of search pages to fetch
    #[clap(short, long, env = "AUTOFINDER_PAGES", default_value_t = DEFAULT_TOTAL_PAGES)]
    pages: usize,

    /// Listings requested per page
    #[clap(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Where the listings go
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Request timeout in seconds
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Enable debug output
    #[clap(short, long)]
    debug: bool,

    /// Plain line output instead of the live progress display
    #[clap(long)]
    no_tui: bool,
}

/// Bad arguments are reported like any other failure; the run still exits 0.
fn parse_args<I, T>(argv: I) -> Option<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Args::try_parse_from(argv) {
        Ok(args) => Some(args),
        Err(e) => {
            e.print().ok();
            None
        }
    }
}

fn main() -> Result<()> {
    let Some(args) = parse_args(std::env::args_os()) else {
        return Ok(());
    };
    let debug_enabled = debug::init_debug(args.debug);

    let options = ScrapingOptions {
        output_file: args.output,
        total_pages: args.pages,
        page_size: args.page_size,
        timeout_secs: args.timeout,
        format: args.format,
    };

    let client = match MarktplaatsClient::new(Duration::from_secs(options.timeout_secs)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(());
        }
    };

    let mut tui = ScraperTUI::new();
    let tui = if debug_enabled || args.no_tui { None } else { Some(&mut tui) };

    let result = run_scraper_with_options(&client, &options, tui);

    utils::write_output(options.format, &result.listings, &options.output_file);

    println!("\n=== Summary ===");
    println!("Pages fetched: {}", result.pages_fetched);
    println!("Listings collected: {}", result.listings.len());
    println!("Stopped: {}", result.stop_reason);

    Ok(())
}
