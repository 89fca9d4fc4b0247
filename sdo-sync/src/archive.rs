use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use percent_encoding::percent_decode_str;
use reqwest::blocking::Client;
use reqwest::Url;
use scraper::{Html, Selector};

use crate::config::Channel;

/// Anything that can hand back the HTML of a directory listing.
pub trait ListingSource {
    fn fetch_listing(&self, url: &Url) -> Result<String>;
}

/// Fetches listings over HTTP with a blocking client.
#[derive(Debug, Clone)]
pub struct HttpListing {
    client: Client,
}

impl HttpListing {
    pub fn new(timeout: Duration) -> Result<HttpListing> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpListing { client })
    }
}

impl ListingSource for HttpListing {
    fn fetch_listing(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("Failed to send request to {}", url))?
            .error_for_status()
            .with_context(|| format!("Listing request to {} was rejected", url))?;
        response.text().context("Failed to get response text")
    }
}

/// `<base>/<YYYY>/<MM>/<DD>/` for the given date.
pub fn date_url(base: &Url, date: NaiveDate) -> Result<Url> {
    let path = format!("{:04}/{:02}/{:02}/", date.year(), date.month(), date.day());
    base.join(&path)
        .with_context(|| format!("Failed to join {} onto {}", path, base))
}

/// `<date_url>/<channel>/`.
pub fn channel_url(date_url: &Url, channel: Channel) -> Result<Url> {
    date_url
        .join(&format!("{}/", channel.id()))
        .with_context(|| format!("Failed to build listing URL for channel {}", channel))
}

/// Pull every anchor out of a listing page whose target ends with `extension`
/// and resolve it against the listing URL.
pub fn parse_listing(html: &str, listing_url: &Url, extension: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut files = Vec::new();
    for anchor in document.select(&anchor_selector) {
        let href = match anchor.value().attr("href") {
            Some(href) => href.trim(),
            None => continue,
        };

        // query strings and fragments don't count towards the suffix
        let href_path = href.split(['?', '#']).next().unwrap_or("");
        if href_path.is_empty() || !href_path.ends_with(extension) {
            continue;
        }

        match listing_url.join(href) {
            Ok(url) => files.push(url),
            Err(e) => log::warn!("Skipping unresolvable link '{}' on {}: {}", href, listing_url, e),
        }
    }

    files
}

/// Fetch one listing page and return the matching file URLs.
pub fn list_files<L: ListingSource + ?Sized>(
    source: &L,
    listing_url: &Url,
    extension: &str,
) -> Result<Vec<Url>> {
    let html = source.fetch_listing(listing_url)?;
    Ok(parse_listing(&html, listing_url, extension))
}

/// Name the downloaded file will have on disk: the last path segment,
/// percent-decoded the way `wget` saves it. Names that would escape the
/// channel directory are rejected.
pub fn local_filename(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())?;
    let name = percent_decode_str(segment).decode_utf8().ok()?;
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return None;
    }
    Some(name.into_owned())
}
