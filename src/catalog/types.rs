//! Wire and domain types for the catalog.
//!
//! `*Dto` types mirror the REST payloads exactly and are only ever
//! produced by a [`CatalogClient`](super::CatalogClient). The mapper turns
//! them into the domain types at the bottom of this file.

use serde::{Deserialize, Serialize};

// ============================================================================
// Wire Types
// ============================================================================

/// One page of the `/pokemon` listing.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PageDto {
    pub count: u32,
    /// Continuation URL. Absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<ResourceDto>,
}

/// A `{name, url}` pair pointing at a catalog resource.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ResourceDto {
    pub name: String,
    pub url: String,
}

/// The `/pokemon/{id}` payload, reduced to the fields the detail view shows.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PokemonDto {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub types: Vec<TypeSlotDto>,
    #[serde(default)]
    pub stats: Vec<StatDto>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TypeSlotDto {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedDto,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StatDto {
    pub base_stat: u32,
    pub stat: NamedDto,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct NamedDto {
    pub name: String,
}

// ============================================================================
// Domain Types
// ============================================================================

/// A catalog entry. Immutable once built by the mapper.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub image_url: String,
}

/// Result of one listing fetch. Items keep server order.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    pub has_more: bool,
}

/// Everything the detail view renders for a single entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    /// Decimetres, as served.
    pub height: u32,
    /// Hectograms, as served.
    pub weight: u32,
    /// Ordered by slot.
    pub types: Vec<String>,
    pub stats: Vec<(String, u32)>,
    pub image_url: String,
}
