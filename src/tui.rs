use crossterm::{
    cursor::MoveToPreviousLine,
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io;

/// Live one-line progress for the page loop, redrawn in place.
pub struct ScraperTUI {
    total_pages: usize,
    pages_done: usize,
    listings_found: usize,
    status_line_printed: bool,
}

impl ScraperTUI {
    pub fn new() -> Self {
        Self {
            total_pages: 0,
            pages_done: 0,
            listings_found: 0,
            status_line_printed: false,
        }
    }

    /// Show initial fetching status
    pub fn start_fetching(&mut self, source: &str, total_pages: usize) -> io::Result<()> {
        self.total_pages = total_pages;
        self.pages_done = 0;
        self.listings_found = 0;

        execute!(
            io::stdout(),
            SetForegroundColor(Color::DarkGrey),
            Print(format!("🚗 {} car listings\n", source)),
            ResetColor
        )?;
        self.print_status_line()?;
        self.status_line_printed = true;
        Ok(())
    }

    pub fn update_page_progress(&mut self, pages_done: usize, listings_found: usize) -> io::Result<()> {
        self.pages_done = pages_done;
        self.listings_found = listings_found;
        self.redraw_status_line()
    }

    /// Grey note for a page that came back empty
    pub fn page_empty(&mut self, page_index: usize) -> io::Result<()> {
        self.clear_status_line()?;
        execute!(
            io::stdout(),
            SetForegroundColor(Color::DarkGrey),
            Print(format!("  ⏹  Page {} returned no listings, stopping\n", page_index + 1)),
            ResetColor
        )?;
        self.print_status_line()
    }

    pub fn page_failed(&mut self, page_index: usize, error: &str) -> io::Result<()> {
        self.clear_status_line()?;
        execute!(
            io::stdout(),
            SetForegroundColor(Color::Red),
            Print(format!("  ❌ Page {} failed: {}\n", page_index + 1, Self::truncate(error))),
            ResetColor
        )?;
        self.print_status_line()
    }

    /// Replace the live line with the final count
    pub fn finish_fetching(&mut self, pages_fetched: usize, total_listings: usize) -> io::Result<()> {
        self.clear_status_line()?;
        self.status_line_printed = false;

        let color = if total_listings > 0 { Color::Green } else { Color::Yellow };
        execute!(
            io::stdout(),
            SetForegroundColor(color),
            Print(format!(
                "✅ Collected {} listings from {} page{}\n",
                total_listings,
                pages_fetched,
                if pages_fetched == 1 { "" } else { "s" }
            )),
            ResetColor
        )?;
        Ok(())
    }

    fn redraw_status_line(&self) -> io::Result<()> {
        self.clear_status_line()?;
        self.print_status_line()
    }

    fn clear_status_line(&self) -> io::Result<()> {
        if self.status_line_printed {
            execute!(
                io::stdout(),
                MoveToPreviousLine(1),
                Clear(ClearType::CurrentLine),
            )?;
        }
        Ok(())
    }

    fn print_status_line(&self) -> io::Result<()> {
        execute!(
            io::stdout(),
            SetForegroundColor(Color::White),
            Print(self.status_text()),
            Print("\n"),
            ResetColor
        )
    }

    fn status_text(&self) -> String {
        let spinner = match self.pages_done % 4 {
            0 => "⠋",
            1 => "⠙",
            2 => "⠹",
            _ => "⠸",
        };

        let bar_width = 20;
        let filled = (self.pages_done * bar_width) / self.total_pages.max(1);
        let filled = filled.min(bar_width);

        format!(
            "{} Fetching pages [{}{}] {}/{} - {} listings",
            spinner,
            "█".repeat(filled),
            "░".repeat(bar_width - filled),
            self.pages_done,
            self.total_pages,
            self.listings_found
        )
    }

    fn truncate(text: &str) -> String {
        if text.chars().count() > 80 {
            let head: String = text.chars().take(77).collect();
            format!("{}...", head)
        } else {
            text.to_string()
        }
    }
}

impl Default for ScraperTUI {
    fn default() -> Self {
        Self::new()
    }
}
