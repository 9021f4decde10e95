use crate::models::{CarListing, ListingBatch};
use crate::parser;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// Excel only picks up UTF-8 when the file starts with a BOM.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width table on stdout
    Table,
    /// CSV file
    Csv,
}

pub fn print_listing_table<W: Write>(out: &mut W, listings: &[CarListing]) -> io::Result<()> {
    if listings.is_empty() {
        writeln!(out, "No listings found or API access blocked.")?;
        return Ok(());
    }

    writeln!(out, "{:<50} | {:<12} | {:<10} | {}", "TITLE", "PRICE", "FUEL", "GEARBOX")?;
    writeln!(out, "{}", "-".repeat(90))?;

    for listing in listings {
        writeln!(
            out,
            "{:<50} | {:<12} | {:<10} | {}",
            parser::truncate_title(&listing.title),
            listing.price,
            listing.fuel,
            listing.transmission
        )?;
    }

    Ok(())
}

/// Writes a BOM, the header row and one row per listing. Returns the row count.
pub fn save_listings_to_csv(listings: &[CarListing], output_path: &str) -> Result<usize> {
    let mut file = File::create(Path::new(output_path))
        .context(format!("Failed to create output file: {}", output_path))?;
    file.write_all(UTF8_BOM)
        .context(format!("Failed to write to {}", output_path))?;

    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    if listings.is_empty() {
        writer.write_record(["Title", "Price", "Fuel", "Transmission"])?;
    }
    for listing in listings {
        writer
            .serialize(listing)
            .context(format!("Failed to write row to {}", output_path))?;
    }

    writer
        .flush()
        .context(format!("Failed to flush {}", output_path))?;

    Ok(listings.len())
}

pub fn load_listings_from_csv(input_path: &str) -> Result<Vec<CarListing>> {
    let mut bytes = Vec::new();
    File::open(Path::new(input_path))
        .context(format!("Failed to open input file: {}", input_path))?
        .read_to_end(&mut bytes)
        .context(format!("Failed to read {}", input_path))?;

    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
    let mut reader = csv::Reader::from_reader(content);

    let mut listings = Vec::new();
    for result in reader.deserialize() {
        let listing: CarListing = result.context(format!("Malformed row in {}", input_path))?;
        listings.push(listing);
    }

    Ok(listings)
}

/// Sends the batch to the chosen sink. Failures are reported, never returned.
pub fn write_output(format: OutputFormat, listings: &ListingBatch, output_path: &str) {
    match format {
        OutputFormat::Table => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            if let Err(e) = print_listing_table(&mut out, listings.as_slice()) {
                eprintln!("Error printing listings: {}", e);
            }
        }
        OutputFormat::Csv => match save_listings_to_csv(listings.as_slice(), output_path) {
            Ok(count) => println!("Saved {} listings to {}", count, output_path),
            Err(e) => eprintln!("Error saving CSV: {:#}", e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(title: &str, price: &str, fuel: &str, transmission: &str) -> CarListing {
        CarListing {
            title: title.to_string(),
            price: price.to_string(),
            fuel: fuel.to_string(),
            transmission: transmission.to_string(),
        }
    }

    fn sample() -> Vec<CarListing> {
        vec![
            car("Peugeot 208, 1.2 PureTech \"Allure\"", "€14,950.00", "Benzine", "Handgeschakeld"),
            car("Tesla Model 3 Long Range AWD", "Bieden / Negotiable", "Elektrisch", "Automaat"),
            car("Unknown Title", "€1,250.50", "N/A", "N/A"),
        ]
    }

    #[test]
    fn csv_round_trip_keeps_rows_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.csv");
        let path = path.to_str().unwrap();

        let listings = sample();
        let written = save_listings_to_csv(&listings, path).unwrap();
        assert_eq!(written, 3);

        let loaded = load_listings_from_csv(path).unwrap();
        assert_eq!(loaded, listings);

        let raw = std::fs::read(path).unwrap();
        assert!(raw.starts_with(UTF8_BOM));
        let text = String::from_utf8(raw[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.lines().next(), Some("Title,Price,Fuel,Transmission"));
    }

    #[test]
    fn empty_batch_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let path = path.to_str().unwrap();

        assert_eq!(save_listings_to_csv(&[], path).unwrap(), 0);

        let raw = std::fs::read_to_string(path).unwrap();
        assert_eq!(raw.trim_start_matches('\u{feff}').trim_end(), "Title,Price,Fuel,Transmission");
        assert!(load_listings_from_csv(path).unwrap().is_empty());
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cars.csv");

        assert!(save_listings_to_csv(&sample(), path.to_str().unwrap()).is_err());
    }

    #[test]
    fn write_output_swallows_csv_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cars.csv");
        let mut batch = ListingBatch::new();
        batch.extend(sample());

        write_output(OutputFormat::Csv, &batch, path.to_str().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn table_truncates_title_but_csv_keeps_it() {
        let long_title = "Mercedes-Benz E-Klasse Estate 300 e Business Solution AMG Plug-In Hybride";
        assert!(long_title.chars().count() > 48);
        let listings = vec![car(long_title, "€42,500.00", "Hybride", "Automaat")];

        let mut out = Vec::new();
        print_listing_table(&mut out, &listings).unwrap();
        let table = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("TITLE "));
        assert!(lines[0].ends_with("| GEARBOX"));
        assert_eq!(lines[1], "-".repeat(90));
        assert!(!table.contains(long_title));
        assert!(lines[2].starts_with(&parser::truncate_title(long_title)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.csv");
        let path = path.to_str().unwrap();
        save_listings_to_csv(&listings, path).unwrap();
        assert_eq!(load_listings_from_csv(path).unwrap()[0].title, long_title);
    }

    #[test]
    fn empty_table_prints_notice() {
        let mut out = Vec::new();
        print_listing_table(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "No listings found or API access blocked.\n"
        );
    }
}
