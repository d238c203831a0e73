use chrono::Utc;
use dexedit_core::{Record, StatBlock, field};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::moves::{LearnableMove, MAX_MOVES, default_moves, suggested_moves};
use crate::names::{SpeciesNames, number_from_dex_id};
use crate::provider::{LatestRequest, SpeciesData, SpeciesProvider, fetch_latest};

pub const TYPES: &[&str] = &[
    "Normal", "Fire", "Water", "Electric", "Grass", "Ice", "Fighting", "Poison", "Ground",
    "Flying", "Psychic", "Bug", "Rock", "Ghost", "Dragon", "Dark", "Steel", "Fairy",
];

/// Abilities offered before a species lookup narrows the list.
pub const ABILITIES: &[&str] = &[
    "Blaze",
    "Overgrow",
    "Torrent",
    "Static",
    "Intimidate",
    "Synchronize",
    "Chlorophyll",
    "Swift Swim",
    "Sand Stream",
    "Pressure",
    "Levitate",
];

pub const GROWTH_RATES: &[&str] = &[
    "slow",
    "medium-slow",
    "medium",
    "medium-fast",
    "fast",
    "fluctuating",
    "erratic",
];

pub const MAX_TYPES: usize = 2;
pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 100;
const MAX_IV: u8 = 31;

/// A record being composed before it is appended to the list.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub name: String,
    pub nickname: String,
    pub level: u32,
    pub gender: String,
    pub id: u32,
    pub ability: String,
    pub types: Vec<String>,
    pub stats: StatBlock,
    pub ev: StatBlock,
    pub iv: StatBlock,
    pub attacks: Vec<String>,
    pub base_experience: i64,
    pub current_hp: i64,
    pub growth_rate: String,
    pub friendship: i64,
    pub pokemon_defeated: i64,
    pub everstone: bool,
    pub shiny: bool,
    pub mega: bool,
    pub available_abilities: Vec<String>,
    pub available_moves: Vec<LearnableMove>,
}

impl Default for RecordDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            nickname: String::new(),
            level: MIN_LEVEL,
            gender: "M".to_string(),
            id: 1,
            ability: "Blaze".to_string(),
            types: vec!["Fire".to_string()],
            stats: StatBlock {
                xp: Some(0),
                ..StatBlock::uniform(50)
            },
            ev: StatBlock::uniform(0),
            iv: random_ivs(),
            attacks: vec!["tackle".to_string(), "ember".to_string()],
            base_experience: 100,
            current_hp: 50,
            growth_rate: "medium".to_string(),
            friendship: 0,
            pokemon_defeated: 0,
            everstone: false,
            shiny: false,
            mega: false,
            available_abilities: ABILITIES.iter().map(|a| a.to_string()).collect(),
            available_moves: Vec::new(),
        }
    }
}

impl RecordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick a species by dex id (`"025"`). Sets name and number and re-rolls
    /// IVs. Returns the numeric id to look up, or `None` if `dex_id` is not a
    /// number.
    pub fn select_species(&mut self, dex_id: &str, names: &SpeciesNames) -> Option<u32> {
        let number = number_from_dex_id(dex_id)?;
        self.name = names.get(dex_id).unwrap_or_default().to_string();
        self.id = number;
        self.iv = random_ivs();
        Some(number)
    }

    /// Prefill from looked-up species attributes.
    pub fn apply_species(&mut self, data: &SpeciesData) {
        self.types = data.types.iter().take(MAX_TYPES).cloned().collect();
        self.available_abilities = data.abilities.clone();
        if let Some(first) = data.abilities.first() {
            self.ability = first.clone();
        }
        self.stats = data.base_stats.clone();
        if let Some(hp) = data.base_stats.hp {
            self.current_hp = hp;
        }
        if let Some(rate) = &data.growth_rate {
            self.growth_rate = rate.clone();
        }
        if let Some(happiness) = data.base_happiness {
            self.friendship = happiness;
        }
        self.base_experience = data.base_experience;

        self.available_moves = data.moves.clone();
        let moves = default_moves(&self.available_moves, self.level);
        if !moves.is_empty() {
            self.attacks = moves;
        }
    }

    /// Look up the selected species and apply it. A failed or superseded
    /// lookup leaves the draft as it was; returns whether data was applied.
    pub async fn prefill<P>(&mut self, provider: &P, guard: &LatestRequest) -> bool
    where
        P: SpeciesProvider + ?Sized,
    {
        match fetch_latest(provider, guard, self.id).await {
            Ok(Some(data)) => {
                self.apply_species(&data);
                info!(id = self.id, provider = provider.name(), "prefilled draft");
                true
            }
            Ok(None) => {
                debug!(id = self.id, "species lookup superseded");
                false
            }
            Err(e) => {
                warn!(id = self.id, provider = provider.name(), error = %e, "species lookup failed");
                false
            }
        }
    }

    /// Set the level (clamped to 1..=100) and re-suggest level-up moves.
    pub fn set_level(&mut self, level: u32) {
        self.level = level.clamp(MIN_LEVEL, MAX_LEVEL);
        let moves = suggested_moves(&self.available_moves, self.level);
        if !moves.is_empty() {
            self.attacks = moves;
        }
    }

    /// Add or remove a type. Adding beyond two types is ignored. Returns
    /// whether the type is now selected.
    pub fn toggle_type(&mut self, ty: &str) -> bool {
        toggle(&mut self.types, ty, MAX_TYPES)
    }

    /// Add or remove a move. Adding beyond four moves is ignored.
    pub fn toggle_attack(&mut self, attack: &str) -> bool {
        toggle(&mut self.attacks, attack, MAX_MOVES)
    }

    /// Finish the draft as a record with a fresh identity and capture time.
    pub fn build(&self) -> Record {
        Record::default()
            .with(field::NAME, self.name.as_str())
            .with(field::NICKNAME, self.nickname.as_str())
            .with(field::LEVEL, self.level)
            .with("gender", self.gender.as_str())
            .with(field::SPECIES_ID, self.id)
            .with("ability", self.ability.as_str())
            .with("type", self.types.clone())
            .with(field::STATS, self.stats.to_value())
            .with("ev", self.ev.to_value())
            .with("iv", self.iv.to_value())
            .with("attacks", self.attacks.clone())
            .with("base_experience", self.base_experience)
            .with("current_hp", self.current_hp)
            .with("growth_rate", self.growth_rate.as_str())
            .with("friendship", self.friendship)
            .with("pokemon_defeated", self.pokemon_defeated)
            .with("everstone", self.everstone)
            .with("shiny", self.shiny)
            .with("captured_date", Utc::now().format("%Y-%m-%d %H:%M:%S").to_string())
            .with(field::IDENTITY, Uuid::new_v4().to_string())
            .with("mega", self.mega)
            .with("special-form", Value::Null)
            .with("evos", Value::Array(Vec::new()))
    }
}

fn toggle(list: &mut Vec<String>, value: &str, max: usize) -> bool {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
        return false;
    }
    if list.len() >= max {
        return false;
    }
    list.push(value.to_string());
    true
}

/// Six IVs in 0..=31 drawn from a v4 uuid's random bytes.
fn random_ivs() -> StatBlock {
    let bytes = Uuid::new_v4().into_bytes();
    let iv = |i: usize| Some(i64::from(bytes[i] % (MAX_IV + 1)));
    StatBlock {
        hp: iv(0),
        atk: iv(1),
        def: iv(2),
        spa: iv(3),
        spd: iv(4),
        spe: iv(5),
        xp: None,
    }
}
