//! # Page Mapper
//!
//! Pure translation from wire payloads to domain types.
//!
//! - Identifiers come from the trailing path segment of the resource URL,
//!   so `.../pokemon/25` and `.../pokemon/25/` both yield `25`.
//! - Names get their first character uppercased, nothing else.
//! - `has_more` follows the `next` continuation link, never item counts.

use std::fmt;

use super::types::{Item, Page, PageDto, PokemonDetail, PokemonDto, ResourceDto};

const ARTWORK_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// URL has no trailing numeric segment (or it is zero).
    InvalidResourceUrl(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidResourceUrl(url) => write!(f, "invalid resource url: {url:?}"),
        }
    }
}

impl std::error::Error for MapError {}

/// Maps one listing page. Fails on the first entry whose URL has no id.
pub fn map_page(dto: PageDto) -> Result<Page, MapError> {
    let has_more = dto.next.as_deref().is_some_and(|next| !next.is_empty());
    let items = dto
        .results
        .into_iter()
        .map(map_item)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page { items, has_more })
}

pub fn map_item(resource: ResourceDto) -> Result<Item, MapError> {
    let id = extract_id(&resource.url)?;
    Ok(Item {
        id,
        name: capitalize(&resource.name),
        image_url: image_url(id),
    })
}

pub fn map_detail(dto: PokemonDto) -> PokemonDetail {
    let mut slots = dto.types;
    slots.sort_by_key(|t| t.slot);

    PokemonDetail {
        id: dto.id,
        name: capitalize(&dto.name),
        height: dto.height,
        weight: dto.weight,
        types: slots.iter().map(|t| capitalize(&t.kind.name)).collect(),
        stats: dto
            .stats
            .into_iter()
            .map(|s| (s.stat.name, s.base_stat))
            .collect(),
        image_url: image_url(dto.id),
    }
}

/// Parses the id out of `https://host/api/v2/pokemon/{id}[/]`.
pub fn extract_id(url: &str) -> Result<u32, MapError> {
    let trimmed = url.strip_suffix('/').unwrap_or(url);
    trimmed
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| MapError::InvalidResourceUrl(url.to_string()))
}

/// Uppercases the first character; the rest passes through untouched.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn image_url(id: u32) -> String {
    format!("{ARTWORK_BASE_URL}/{id}.png")
}
