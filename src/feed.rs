//! RSS 2.0 feed composition.
//!
//! One `<item>` per entry, in the order the pipeline hands them over (newest
//! first). The full rendered body travels in `content:encoded` so readers can
//! show the whole post.
//!
//! Links follow the same rule as the pages: with `site.base_url` configured
//! they are absolute, otherwise they are relative to the output root. The
//! build time is passed in so the feed is reproducible in tests.

use crate::config::SiteConfig;
use crate::dates;
use crate::entry::Entry;
use crate::generate::entry_href;
use chrono::{DateTime, Utc};
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::collections::BTreeMap;

pub const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

/// Permalink of an entry: absolute under the base URL when one is set.
pub fn permalink(entry: &Entry, config: &SiteConfig) -> String {
    let href = entry_href(&config.paths, &entry.slug);
    match &config.site.base_url {
        Some(base) => format!("{base}/{href}"),
        None => href,
    }
}

/// Build the feed channel.
pub fn build_channel(entries: &[Entry], config: &SiteConfig, built_at: DateTime<Utc>) -> Channel {
    let items: Vec<Item> = entries.iter().map(|e| entry_item(e, config)).collect();

    let mut namespaces = BTreeMap::new();
    namespaces.insert("content".to_string(), CONTENT_NAMESPACE.to_string());

    ChannelBuilder::default()
        .namespaces(namespaces)
        .title(&config.site.title)
        .link(config.site.base_url.clone().unwrap_or_default())
        .description(&config.site.description)
        .last_build_date(Some(dates::rfc1123(built_at)))
        .generator(Some(concat!("shelfmark ", env!("CARGO_PKG_VERSION")).to_string()))
        .items(items)
        .build()
}

/// Render the feed document.
pub fn render_feed(entries: &[Entry], config: &SiteConfig, built_at: DateTime<Utc>) -> String {
    build_channel(entries, config, built_at).to_string()
}

fn entry_item(entry: &Entry, config: &SiteConfig) -> Item {
    let link = permalink(entry, config);
    let pub_date = Some(dates::format_feed_date(&entry.raw_date)).filter(|d| !d.is_empty());
    let description = Some(entry.summary.clone()).filter(|s| !s.is_empty());

    ItemBuilder::default()
        .title(Some(entry.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .description(description)
        .content(Some(entry.body_html.clone()))
        .pub_date(pub_date)
        .build()
}
