pub mod client;
pub mod mapper;
pub mod pokeapi;
pub mod repository;
pub mod types;

pub use client::{CatalogClient, CatalogError};
pub use mapper::MapError;
pub use pokeapi::PokeApiClient;
pub use repository::{DEFAULT_PAGE_SIZE, RepoError, Repository};
pub use types::{Item, Page, PageDto, PokemonDetail, PokemonDto, ResourceDto};
