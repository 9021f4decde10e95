use anyhow::Result;
use clap::Parser;
use autofinder::common_scraper::{run_scraper_with_options, ScrapingOptions};
use autofinder::scraper::{MarktplaatsClient, DEFAULT_TIMEOUT_SECS};
use autofinder::utils::{self, OutputFormat};
use autofinder::debug;
use std::time::Duration;

/// Prints the first page of car listings as a table.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Enable debug output
    #[clap(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return Ok(());
        }
    };
    debug::init_debug(args.debug);

    let options = ScrapingOptions {
        total_pages: 1,
        format: OutputFormat::Table,
        ..ScrapingOptions::default()
    };

    let client = match MarktplaatsClient::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(());
        }
    };

    let result = run_scraper_with_options(&client, &options, None);
    utils::write_output(options.format, &result.listings, &options.output_file);

    Ok(())
}
