use crate::models::{RawListing, SearchResponse};
use crate::debug_println;
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Url;
use std::time::Duration;

pub const SEARCH_URL: &str = "https://www.marktplaats.nl/lrp/api/search";
pub const DEFAULT_PAGE_SIZE: usize = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const CAR_ATTRIBUTE_ID: &str = "10882";
const CARS_CATEGORY_ID: &str = "91";
const VIEW_OPTIONS: &str = "list-view";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Anything that can hand out one page of raw listings.
pub trait ListingSource {
    fn name(&self) -> &str;
    fn fetch_page(&self, page_index: usize, page_size: usize) -> Result<Vec<RawListing>>;
}

/// The fixed car search. Only the offset changes from page to page.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub base_url: String,
    pub attribute_id: String,
    pub category_id: String,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            base_url: SEARCH_URL.to_string(),
            attribute_id: CAR_ATTRIBUTE_ID.to_string(),
            category_id: CARS_CATEGORY_ID.to_string(),
        }
    }
}

impl SearchQuery {
    pub fn page_url(&self, page_index: usize, page_size: usize) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid search URL: {}", self.base_url))?;

        let offset = page_index.checked_mul(page_size).with_context(|| {
            format!("Offset overflows for page {} with page size {}", page_index, page_size)
        })?;
        url.query_pairs_mut()
            .append_pair("attributesById[]", &self.attribute_id)
            .append_pair("l1CategoryId", &self.category_id)
            .append_pair("limit", &page_size.to_string())
            .append_pair("offset", &offset.to_string())
            .append_pair("viewOptions", VIEW_OPTIONS);

        Ok(url)
    }
}

/// Pulls the `listings` array out of a search response body.
pub fn parse_search_response(body: &str) -> Result<Vec<RawListing>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("Unexpected search response format")?;
    Ok(response.listings)
}

pub struct MarktplaatsClient {
    client: Client,
    query: SearchQuery,
}

impl MarktplaatsClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_query(SearchQuery::default(), timeout)
    }

    pub fn with_query(query: SearchQuery, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, query })
    }
}

impl ListingSource for MarktplaatsClient {
    fn name(&self) -> &str {
        "Marktplaats.nl"
    }

    fn fetch_page(&self, page_index: usize, page_size: usize) -> Result<Vec<RawListing>> {
        let url = self.query.page_url(page_index, page_size)?;
        debug_println!("Fetching search page {}: {}", page_index, url);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, "application/json")
            .send()
            .context("Failed to fetch search page")?;

        if !response.status().is_success() {
            return Err(anyhow!("Failed to fetch search page: HTTP {}", response.status()));
        }

        let body = response.text().context("Failed to read response body")?;
        let listings = parse_search_response(&body)?;

        debug_println!("Page {}: {} listings", page_index, listings.len());
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    #[test]
    fn page_url_carries_fixed_query_and_offset() {
        let url = SearchQuery::default().page_url(3, 30).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.host_str(), Some("www.marktplaats.nl"));
        assert_eq!(url.path(), "/lrp/api/search");
        assert_eq!(
            pairs,
            vec![
                ("attributesById[]".to_string(), "10882".to_string()),
                ("l1CategoryId".to_string(), "91".to_string()),
                ("limit".to_string(), "30".to_string()),
                ("offset".to_string(), "90".to_string()),
                ("viewOptions".to_string(), "list-view".to_string()),
            ]
        );
    }

    #[test]
    fn first_page_has_zero_offset() {
        let url = SearchQuery::default().page_url(0, 30).unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "offset" && v == "0"));
    }

    #[test]
    fn parses_listings_field() {
        let body = r#"{
            "listings": [
                {"title": "BMW 320i", "priceInfo": {"priceCents": 2150000}, "attributes": []},
                {"title": "Fiat Panda", "attributes": [{"key": "fuel", "value": "Benzine"}]}
            ],
            "totalResultCount": 2
        }"#;

        let listings = parse_search_response(body).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].title.as_deref(), Some("Fiat Panda"));
    }

    #[test]
    fn huge_page_size_is_an_error() {
        assert!(SearchQuery::default().page_url(2, usize::MAX).is_err());
    }

    #[test]
    fn null_fields_keep_the_rest_of_the_page() {
        let body = r#"{
            "listings": [
                {"title": "Skoda Octavia", "attributes": [{"key": "fuel", "value": "Diesel"}]},
                {"title": "Renault Clio", "priceInfo": null, "attributes": null}
            ]
        }"#;

        let listings = parse_search_response(body).unwrap();
        assert_eq!(listings.len(), 2);
        assert!(listings[1].attributes.is_empty());

        assert!(parse_search_response(r#"{"listings": null}"#).unwrap().is_empty());
    }

    #[test]
    fn missing_listings_field_is_empty() {
        let listings = parse_search_response(r#"{"totalResultCount": 0}"#).unwrap();
        assert!(listings.is_empty());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(parse_search_response("<html>blocked</html>").is_err());
        assert!(parse_search_response(r#"{"listings": "nope"}"#).is_err());
    }

    /// Answers one request with `status_line` and `body`, handing back the raw request.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/lrp/api/search", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    fn local_client(base_url: String) -> MarktplaatsClient {
        let query = SearchQuery {
            base_url,
            ..SearchQuery::default()
        };
        MarktplaatsClient::with_query(query, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn server_error_status_is_an_error() {
        let (base_url, handle) = serve_once("HTTP/1.1 500 Internal Server Error", "{}");

        let result = local_client(base_url).fetch_page(0, DEFAULT_PAGE_SIZE);
        handle.join().unwrap();

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("500"));
    }

    #[test]
    fn sends_offset_and_browser_headers() {
        let (base_url, handle) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"listings": [{"title": "Mazda MX-5", "priceInfo": {"priceCents": 2499500}}]}"#,
        );

        let listings = local_client(base_url).fetch_page(1, 30).unwrap();
        let request = handle.join().unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title.as_deref(), Some("Mazda MX-5"));

        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /lrp/api/search?"));
        assert!(request_line.contains("offset=30"));
        assert!(request_line.contains("limit=30"));

        let headers = request.to_ascii_lowercase();
        assert!(headers.contains("user-agent: mozilla/5.0"));
        assert!(headers.contains("accept: application/json"));
    }

    #[test]
    fn unreachable_host_is_an_error() {
        let query = SearchQuery {
            base_url: "http://127.0.0.1:9/lrp/api/search".to_string(),
            ..SearchQuery::default()
        };
        let client = MarktplaatsClient::with_query(query, Duration::from_secs(2)).unwrap();

        assert!(client.fetch_page(0, DEFAULT_PAGE_SIZE).is_err());
    }
}
