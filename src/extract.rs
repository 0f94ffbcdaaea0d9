//! Selector-based record extraction from a rendered catalog page
//!
//! Each record field comes from its own CSS selector, and records are formed by
//! zipping the four result-sets by position. When the result-sets disagree in
//! length the page layout cannot be trusted, so the whole page is rejected.

use crate::config::SelectorConfig;
use crate::error::{Error, Result};
use crate::types::ProductRecord;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extract every product record from `html`
///
/// `page_url` is the address the page was loaded from; relative image URLs are
/// resolved against it.
///
/// # Errors
///
/// - [`Error::Config`] if a selector does not parse or `page_url` is not a URL
/// - [`Error::ExtractionMismatch`] if the four selectors match different numbers
///   of elements
pub fn extract_records(
    html: &str,
    page_url: &str,
    selectors: &SelectorConfig,
) -> Result<Vec<ProductRecord>> {
    let base = Url::parse(page_url)
        .map_err(|e| Error::config("catalog.url", format!("invalid page URL: {e}")))?;

    let title_sel = parse_selector("catalog.selectors.title", &selectors.title)?;
    let price_sel = parse_selector("catalog.selectors.price", &selectors.price)?;
    let brand_sel = parse_selector("catalog.selectors.brand", &selectors.brand)?;
    let image_sel = parse_selector("catalog.selectors.image", &selectors.image)?;

    let document = Html::parse_document(html);

    let titles: Vec<String> = document.select(&title_sel).map(text_of).collect();
    let prices: Vec<String> = document.select(&price_sel).map(text_of).collect();
    let brands: Vec<String> = document.select(&brand_sel).map(text_of).collect();
    let images: Vec<String> = document
        .select(&image_sel)
        .map(|el| image_url_of(el, &selectors.image_attribute, &base))
        .collect();

    let n = titles.len();
    if prices.len() != n || brands.len() != n || images.len() != n {
        return Err(Error::ExtractionMismatch {
            titles: titles.len(),
            prices: prices.len(),
            brands: brands.len(),
            images: images.len(),
        });
    }

    let records: Vec<ProductRecord> = titles
        .into_iter()
        .zip(prices)
        .zip(brands)
        .zip(images)
        .map(|(((title, price), brand), image)| ProductRecord {
            title,
            price,
            brand,
            image,
        })
        .collect();

    tracing::debug!(count = records.len(), "Extracted product records");
    Ok(records)
}

fn parse_selector(key: &str, raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| Error::config(key, format!("invalid selector '{raw}': {e}")))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

// A missing attribute becomes an empty string; the downloader abandons it.
fn image_url_of(el: ElementRef<'_>, attribute: &str, base: &Url) -> String {
    let raw = el.value().attr(attribute).unwrap_or("").trim();
    if raw.is_empty() {
        return String::new();
    }
    match base.join(raw) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => raw.to_string(),
    }
}
