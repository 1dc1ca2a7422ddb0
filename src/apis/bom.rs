use crate::config::Config;
use crate::constants::state_code_for_url;
use crate::error::{FireWxError, Result};
use crate::normalize::normalize_rows;
use crate::types::TableRow;
use chrono::{Duration, Utc};
use scraper::{Html, Selector};
use serde_json::Value;
use std::time::Duration as StdDuration;
use tracing::{error, info, instrument, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Scrapes the Bureau of Meteorology fire danger rating pages. Each state
/// page carries one table with districts as rows and weekdays as columns;
/// the seven pages are fetched one at a time and appended into a single
/// normalized table.
pub struct BomRatingsCrawler {
    client: reqwest::Client,
}

impl BomRatingsCrawler {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(StdDuration::from_secs(300))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch and normalize all configured state pages into one rating table.
    #[instrument(skip(self, config))]
    pub async fn fetch_rating_table(&self, config: &Config) -> Result<Vec<TableRow>> {
        info!("Scraping Bureau of Meteorology fire danger ratings");
        println!("Scraping Bureau of Meteorology fire danger ratings");

        // The weekday columns are anchored at yesterday so that a table
        // fetched on any day of the week still maps today's weekday to
        // today rather than a week out.
        let anchor = Utc::now().date_naive() - Duration::days(1);

        let mut table = Vec::new();

        for url in &config.bom_rating_pages {
            let state = state_code_for_url(url).ok_or_else(|| {
                FireWxError::Config(format!("no state code recognized in rating page URL: {url}"))
            })?;

            let response = self
                .client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| {
                    error!("fetch_rating_table failed for {}: {}", state, e);
                    e
                })?;
            println!("  URL: {} - Status Code: {}", url, response.status().as_u16());

            let body = response.text().await?;
            let raw_rows = parse_rating_page(&body)?;
            if raw_rows.is_empty() {
                warn!("No rating rows found on {} page - the structure may have changed", state);
            }

            let normalized = normalize_rows(raw_rows, state, anchor);
            table.extend(normalized);
        }

        info!("Scraped {} district rating rows", table.len());
        Ok(table)
    }
}

/// Parse the first `<table>` of a rating page into one record per body row,
/// keyed by the header cell texts. A page without a table is fatal.
pub fn parse_rating_page(html: &str) -> Result<Vec<TableRow>> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("th, td").unwrap();

    let table = document.select(&table_selector).next().ok_or_else(|| FireWxError::Parse {
        message: "no <table> element found on rating page".to_string(),
    })?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::new();

    for tr in table.select(&row_selector) {
        let cells: Vec<String> = tr
            .select(&cell_selector)
            .map(|cell| {
                cell.text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        if cells.is_empty() {
            continue;
        }

        // First non-empty row is the header row
        if headers.is_empty() {
            headers = cells;
            continue;
        }

        let mut row = TableRow::new();
        for (header, cell) in headers.iter().zip(cells) {
            row.insert(header.clone(), Value::String(cell));
        }
        rows.push(row);
    }

    Ok(rows)
}
