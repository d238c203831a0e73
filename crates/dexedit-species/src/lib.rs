//! dexedit species: PokeAPI lookup, move lists, sprites and record drafts.

pub mod draft;
pub mod error;
pub mod http;
pub mod moves;
pub mod names;
pub mod pokeapi;
pub mod provider;
pub mod sprite;

pub use draft::RecordDraft;
pub use error::{Result, SpeciesError};
pub use moves::{LearnableMove, default_moves, display_name, sort_moves, suggested_moves};
pub use names::{SpeciesNames, dex_id_from_number, number_from_dex_id};
pub use pokeapi::PokeApiSource;
pub use provider::{LatestRequest, RequestTicket, SpeciesData, SpeciesProvider, fetch_latest};
pub use sprite::sprite_url;
