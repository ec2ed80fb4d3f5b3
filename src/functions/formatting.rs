use chrono::{DateTime, Utc};
use url::Url;

/// Release date as shown in the detail view, e.g. "17 Mar 2019".
#[inline]
pub fn format_release_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_default()
}

/// Parse a website URI for the link label. Only absolute URLs with a host
/// qualify.
pub fn website_link(website: &str) -> Option<(String, Url)> {
    let url = Url::parse(website).ok()?;
    let host = url.host_str()?.to_string();
    Some((host, url))
}
