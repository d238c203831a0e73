#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dexedit_core::{SpeciesConfig, StatBlock};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SpeciesError};
use crate::http::{DiskCache, RateLimitedClient};
use crate::moves::{LearnableMove, capitalize, display_name, sort_moves};
use crate::provider::{SpeciesData, SpeciesProvider};

const USER_AGENT: &str = "dexedit/0.1";
const DEFAULT_BASE_STAT: i64 = 50;
const DEFAULT_BASE_EXPERIENCE: i64 = 100;
const MAX_TYPES: usize = 2;
#[cfg(test)]
static TEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct PokeApiSource {
    client: RateLimitedClient,
    cache: DiskCache,
    base_url: String,
}

impl PokeApiSource {
    pub fn new() -> Result<Self> {
        Self::from_config(&SpeciesConfig::default())
    }

    pub fn from_config(config: &SpeciesConfig) -> Result<Self> {
        Self::with_config(
            &config.base_url,
            Duration::from_millis(config.min_interval_ms),
            config.max_retries,
            DiskCache::new("pokeapi", Duration::from_secs(config.cache_ttl_secs)),
        )
    }

    fn with_config(
        base_url: &str,
        min_interval: Duration,
        max_retries: u32,
        cache: DiskCache,
    ) -> Result<Self> {
        Ok(Self {
            client: RateLimitedClient::new(min_interval, max_retries, USER_AGENT)?,
            cache,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn new_for_tests(base_url: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "dexedit_pokeapi_test_{}_{}",
            std::process::id(),
            TEST_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        Self::with_config(
            base_url,
            Duration::from_millis(1),
            0,
            DiskCache::in_dir(dir, Duration::from_secs(60)),
        )
        .unwrap()
    }

    async fn fetch_uncached(&self, id: u32) -> Result<SpeciesData> {
        let url = format!("{}/pokemon/{id}", self.base_url);
        let pokemon: Value = self.client.get_json(&url).await?;

        let species_url = pokemon
            .pointer("/species/url")
            .and_then(Value::as_str)
            .ok_or_else(|| SpeciesError::Parse(format!("pokemon {id} has no species link")))?;
        let species: Value = self.client.get_json(species_url).await?;

        Ok(species_data_from_json(id, &pokemon, &species))
    }
}

#[async_trait]
impl SpeciesProvider for PokeApiSource {
    fn name(&self) -> &str {
        "pokeapi"
    }

    async fn fetch_species(&self, id: u32) -> Result<SpeciesData> {
        if id == 0 {
            return Err(SpeciesError::InvalidId(id.to_string()));
        }

        let cache_key = format!("pokemon:{id}");
        if let Some(cached) = self.cache.get::<SpeciesData>(&cache_key).await {
            debug!(id, "species cache hit");
            return Ok(cached);
        }

        let data = self.fetch_uncached(id).await?;
        self.cache.set(&cache_key, &data).await;
        Ok(data)
    }
}

/// Map the `/pokemon/{id}` and species documents onto [`SpeciesData`].
pub fn species_data_from_json(id: u32, pokemon: &Value, species: &Value) -> SpeciesData {
    let types = named_list(pokemon, "types", "type")
        .into_iter()
        .map(|t| capitalize(&t))
        .take(MAX_TYPES)
        .collect();

    let abilities = named_list(pokemon, "abilities", "ability")
        .into_iter()
        .map(|a| display_name(&a))
        .collect();

    let stats = pokemon.get("stats").and_then(Value::as_array);
    let base_stat = |name: &str| -> Option<i64> {
        let value = stats
            .into_iter()
            .flatten()
            .find(|s| s.pointer("/stat/name").and_then(Value::as_str) == Some(name))
            .and_then(|s| s.get("base_stat"))
            .and_then(Value::as_i64)
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_BASE_STAT);
        Some(value)
    };
    let base_stats = StatBlock {
        hp: base_stat("hp"),
        atk: base_stat("attack"),
        def: base_stat("defense"),
        spa: base_stat("special-attack"),
        spd: base_stat("special-defense"),
        spe: base_stat("speed"),
        xp: Some(0),
    };

    let growth_rate = species
        .pointer("/growth_rate/name")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    let base_happiness = species.get("base_happiness").and_then(Value::as_i64);
    let base_experience = pokemon
        .get("base_experience")
        .and_then(Value::as_i64)
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_BASE_EXPERIENCE);

    let mut moves: Vec<LearnableMove> = pokemon
        .get("moves")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(learnable_move).collect())
        .unwrap_or_default();
    sort_moves(&mut moves);

    SpeciesData {
        id,
        types,
        abilities,
        base_stats,
        growth_rate,
        base_happiness,
        base_experience,
        moves,
    }
}

/// `[{"<inner>": {"name": ..}}, ..]` under `field` → names.
fn named_list(v: &Value, field: &str, inner: &str) -> Vec<String> {
    v.get(field)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|item| item.get(inner)?.get("name")?.as_str())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Level and method come from the most recent version group listing the move.
fn learnable_move(entry: &Value) -> Option<LearnableMove> {
    let name = display_name(entry.pointer("/move/name")?.as_str()?);
    let latest = entry
        .get("version_group_details")?
        .as_array()?
        .iter()
        .max_by_key(|detail| version_group_order(detail))?;

    Some(LearnableMove {
        name,
        level: latest
            .get("level_learned_at")
            .and_then(Value::as_u64)
            .and_then(|l| u32::try_from(l).ok())
            .unwrap_or(0),
        method: latest
            .pointer("/move_learn_method/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Numeric id at the end of the version group URL, e.g. `.../version-group/20/`.
fn version_group_order(detail: &Value) -> u64 {
    detail
        .pointer("/version_group/url")
        .and_then(Value::as_str)
        .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
        .and_then(|seg| seg.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pikachu(species_url: &str) -> Value {
        json!({
            "id": 25,
            "base_experience": 112,
            "species": {"url": species_url},
            "types": [{"slot": 1, "type": {"name": "electric"}}],
            "abilities": [
                {"ability": {"name": "static"}},
                {"ability": {"name": "lightning-rod"}}
            ],
            "stats": [
                {"base_stat": 35, "stat": {"name": "hp"}},
                {"base_stat": 55, "stat": {"name": "attack"}},
                {"base_stat": 40, "stat": {"name": "defense"}},
                {"base_stat": 50, "stat": {"name": "special-attack"}},
                {"base_stat": 50, "stat": {"name": "special-defense"}},
                {"base_stat": 90, "stat": {"name": "speed"}}
            ],
            "moves": [
                {
                    "move": {"name": "thunder-shock"},
                    "version_group_details": [
                        {"level_learned_at": 1, "move_learn_method": {"name": "level-up"},
                         "version_group": {"url": "https://pokeapi.co/api/v2/version-group/1/"}},
                        {"level_learned_at": 0, "move_learn_method": {"name": "level-up"},
                         "version_group": {"url": "https://pokeapi.co/api/v2/version-group/20/"}}
                    ]
                },
                {
                    "move": {"name": "thunderbolt"},
                    "version_group_details": [
                        {"level_learned_at": 0, "move_learn_method": {"name": "machine"},
                         "version_group": {"url": "https://pokeapi.co/api/v2/version-group/20/"}}
                    ]
                },
                {
                    "move": {"name": "quick-attack"},
                    "version_group_details": [
                        {"level_learned_at": 10, "move_learn_method": {"name": "level-up"},
                         "version_group": {"url": "https://pokeapi.co/api/v2/version-group/20/"}}
                    ]
                }
            ]
        })
    }

    fn species_doc() -> Value {
        json!({"growth_rate": {"name": "medium"}, "base_happiness": 50})
    }

    #[test]
    fn maps_pokemon_and_species_documents() {
        let data = species_data_from_json(25, &pikachu("unused"), &species_doc());

        assert_eq!(data.types, vec!["Electric"]);
        assert_eq!(data.abilities, vec!["Static", "Lightning rod"]);
        assert_eq!(data.base_stats.spe, Some(90));
        assert_eq!(data.growth_rate.as_deref(), Some("medium"));
        assert_eq!(data.base_happiness, Some(50));
        assert_eq!(data.base_experience, 112);

        let names: Vec<&str> = data.moves.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Thunder shock", "Quick attack", "Thunderbolt"]);
        assert_eq!(data.moves[0].level, 0);
    }

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let data = species_data_from_json(1, &json!({}), &json!({}));
        assert_eq!(data.base_stats.hp, Some(50));
        assert_eq!(data.base_experience, 100);
        assert!(data.types.is_empty());
        assert!(data.moves.is_empty());
        assert_eq!(data.growth_rate, None);
    }

    #[tokio::test]
    async fn fetches_pokemon_then_species() {
        let mut server = mockito::Server::new_async().await;
        let species_url = format!("{}/pokemon-species/25/", server.url());

        let _p = server
            .mock("GET", "/pokemon/25")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(pikachu(&species_url).to_string())
            .create_async()
            .await;
        let _s = server
            .mock("GET", "/pokemon-species/25/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(species_doc().to_string())
            .create_async()
            .await;

        let source = PokeApiSource::new_for_tests(&server.url());
        let data = source.fetch_species(25).await.unwrap();
        assert_eq!(data.id, 25);
        assert_eq!(data.types, vec!["Electric"]);
        assert_eq!(data.growth_rate.as_deref(), Some("medium"));
    }

    #[tokio::test]
    async fn unknown_species_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/pokemon/9999")
            .with_status(404)
            .create_async()
            .await;

        let source = PokeApiSource::new_for_tests(&server.url());
        let err = source.fetch_species(9999).await.unwrap_err();
        assert!(matches!(err, SpeciesError::NotFound(_)));
    }

    #[tokio::test]
    async fn zero_id_is_rejected_without_a_request() {
        let source = PokeApiSource::new_for_tests("http://127.0.0.1:9");
        let err = source.fetch_species(0).await.unwrap_err();
        assert!(matches!(err, SpeciesError::InvalidId(_)));
    }
}
