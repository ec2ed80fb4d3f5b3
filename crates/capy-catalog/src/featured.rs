//! Featured apps shown on the landing page.

use crate::catalog::Catalog;
use crate::error::DecodeError;

use serde::Deserialize;
use std::io::Read;

/// Descriptions longer than this are cut down for tiles.
pub const MAX_DESCRIPTION_CHARS: usize = 64;

/// Entry of the featured list as published.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Feature {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// Banner image. When set, the tile fields below are unused.
    #[serde(default)]
    pub image: String,
    /// "#rrggbb"
    #[serde(default)]
    pub background: String,
    /// "#rrggbb"
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse "#rrggbb". Anything else is None.
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

/// A featured entry resolved against the catalog.
#[derive(Clone, Debug, PartialEq)]
pub enum FeaturedCard {
    /// Full-width artwork.
    Banner { app_id: String, image_uri: String },
    /// Colored tile with the app name, icon and a short description.
    Tile {
        app_id: String,
        name: String,
        icon_uri: String,
        description: String,
        background: Rgb,
        foreground: Rgb,
    },
}

impl FeaturedCard {
    pub fn app_id(&self) -> &str {
        match self {
            FeaturedCard::Banner { app_id, .. } | FeaturedCard::Tile { app_id, .. } => app_id,
        }
    }
}

/// Decode the featured list.
pub fn parse_featured<R: Read>(reader: R) -> Result<Vec<Feature>, DecodeError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Make site-relative asset paths absolute.
pub fn resolve_asset(path: &str, base: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), path)
    } else {
        path.to_string()
    }
}

/// Shorten long descriptions, marking the cut with an ellipsis.
pub fn truncate_description(desc: &str) -> String {
    if desc.chars().count() <= MAX_DESCRIPTION_CHARS {
        return desc.to_string();
    }

    let mut short: String = desc.chars().take(MAX_DESCRIPTION_CHARS - 2).collect();
    short.push('…');
    short
}

/// Turn featured entries into cards. Entries naming apps that are not in
/// the catalog are dropped; unparsable colors fall back to black.
pub fn build_cards(features: &[Feature], catalog: &Catalog, asset_base: &str) -> Vec<FeaturedCard> {
    features
        .iter()
        .filter_map(|feature| {
            let app = catalog.get(&feature.id)?;

            if !feature.image.is_empty() {
                return Some(FeaturedCard::Banner {
                    app_id: app.id.clone(),
                    image_uri: resolve_asset(&feature.image, asset_base),
                });
            }

            Some(FeaturedCard::Tile {
                app_id: app.id.clone(),
                name: app.name.clone(),
                icon_uri: resolve_asset(&feature.icon, asset_base),
                description: truncate_description(&feature.description),
                background: Rgb::parse_hex(&feature.background).unwrap_or_default(),
                foreground: Rgb::parse_hex(&feature.color).unwrap_or_default(),
            })
        })
        .collect()
}
