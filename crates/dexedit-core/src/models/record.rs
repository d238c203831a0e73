use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::lenient;
use crate::error::EditorError;

/// Keys of the record fields the editor reads or writes.
pub mod field {
    pub const NAME: &str = "name";
    pub const NICKNAME: &str = "nickname";
    pub const LEVEL: &str = "level";
    pub const SPECIES_ID: &str = "id";
    pub const STATS: &str = "stats";
    pub const IDENTITY: &str = "individual_id";
}

// ─── Record ─────────────────────────────────────────────────

/// One creature profile in the editable list.
///
/// The record is the uploaded JSON object itself. Nothing is validated or
/// normalised on the way in, so export writes back exactly what was loaded
/// plus whatever the editor set. The accessors below read the few fields the
/// duplicate detector and listings need, tolerating missing or odd values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Create a record with a name and a fresh identity.
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        let mut record = Self::default().with(field::NAME, name);
        record.ensure_identity();
        record
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set `key`, keeping its position if it already exists.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    // ─── Typed reads ───────────────────────────────────────

    /// Name rendered as text; empty when missing or not scalar.
    pub fn name(&self) -> Cow<'_, str> {
        self.text(field::NAME).unwrap_or_default()
    }

    pub fn nickname(&self) -> Cow<'_, str> {
        self.text(field::NICKNAME).unwrap_or_default()
    }

    pub fn level(&self) -> Option<i64> {
        self.get(field::LEVEL).and_then(lenient::int)
    }

    /// National dex number of the species.
    pub fn species_id(&self) -> Option<i64> {
        self.get(field::SPECIES_ID).and_then(lenient::int)
    }

    /// The `stats` block. A missing or non-object block reads as all `None`.
    pub fn stats(&self) -> StatBlock {
        self.get(field::STATS).map(StatBlock::from_value).unwrap_or_default()
    }

    /// The identity if present and non-empty.
    pub fn identity(&self) -> Option<Cow<'_, str>> {
        self.text(field::IDENTITY).filter(|id| !id.is_empty())
    }

    /// Assign an identity unless one is already set. Returns `true` if assigned.
    pub fn ensure_identity(&mut self) -> bool {
        if self.identity().is_some() {
            return false;
        }
        self.set(field::IDENTITY, Uuid::new_v4().to_string());
        true
    }

    fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).and_then(lenient::text)
    }

    // ─── Display ───────────────────────────────────────────

    /// `"Nickname (Name)"` or just the name.
    pub fn display_label(&self) -> String {
        let nickname = self.nickname();
        if nickname.is_empty() {
            self.name().into_owned()
        } else {
            format!("{nickname} ({})", self.name())
        }
    }

    /// Species number padded to three digits, e.g. `025`.
    pub fn dex_number(&self) -> String {
        match self.species_id() {
            Some(id) => format!("{id:03}"),
            None => "???".to_string(),
        }
    }

    /// First eight characters of the identity, for compact listings.
    pub fn identity_prefix(&self) -> Option<String> {
        self.identity().map(|id| id.chars().take(8).collect())
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for Record {
    type Error = EditorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(EditorError::InvalidUpload(format!(
                "expected a record object, found {}",
                lenient::kind(&other)
            ))),
        }
    }
}

// ─── Stats ──────────────────────────────────────────────────

/// Six battle stats, plus experience on the `stats` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atk: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spa: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spd: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spe: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<i64>,
}

impl StatBlock {
    const KEYS: [&'static str; 7] = ["hp", "atk", "def", "spa", "spd", "spe", "xp"];

    /// A block with all six stats set to `value` and no experience.
    pub fn uniform(value: i64) -> Self {
        Self {
            hp: Some(value),
            atk: Some(value),
            def: Some(value),
            spa: Some(value),
            spd: Some(value),
            spe: Some(value),
            xp: None,
        }
    }

    /// Read a stats object leniently; unreadable entries become `None`.
    pub fn from_value(value: &Value) -> Self {
        let stat = |key: &str| value.get(key).and_then(lenient::int);
        Self {
            hp: stat("hp"),
            atk: stat("atk"),
            def: stat("def"),
            spa: stat("spa"),
            spd: stat("spd"),
            spe: stat("spe"),
            xp: stat("xp"),
        }
    }

    /// JSON object with the stats that are set, in `hp..spe, xp` order.
    pub fn to_value(&self) -> Value {
        let values = [self.hp, self.atk, self.def, self.spa, self.spd, self.spe, self.xp];
        let fields: Map<String, Value> = Self::KEYS
            .iter()
            .zip(values)
            .filter_map(|(key, v)| v.map(|v| (key.to_string(), Value::from(v))))
            .collect();
        Value::Object(fields)
    }

    /// The six core stats in fixed order: hp, atk, def, spa, spd, spe.
    pub fn core(&self) -> [Option<i64>; 6] {
        [self.hp, self.atk, self.def, self.spa, self.spd, self.spe]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        Record::try_from(value).unwrap()
    }

    #[test]
    fn reads_a_full_record() {
        let r = record(json!({
            "name": "Pikachu",
            "nickname": "Sparky",
            "level": 5,
            "gender": "M",
            "id": 25,
            "ability": "Static",
            "type": ["Electric"],
            "stats": {"hp": 35, "atk": 55, "def": 40, "spa": 50, "spd": 50, "spe": 90, "xp": 0},
            "attacks": ["Thunder Shock", "Growl"],
            "individual_id": "0f8e3c1a-aaaa-bbbb-cccc-000000000000",
            "special-form": null,
            "evos": []
        }));

        assert_eq!(r.name(), "Pikachu");
        assert_eq!(r.level(), Some(5));
        assert_eq!(r.stats().core(), [Some(35), Some(55), Some(40), Some(50), Some(50), Some(90)]);
        assert_eq!(r.display_label(), "Sparky (Pikachu)");
        assert_eq!(r.dex_number(), "025");
        assert_eq!(r.identity_prefix().as_deref(), Some("0f8e3c1a"));
    }

    #[test]
    fn odd_values_read_as_missing() {
        let r = record(json!({"name": null, "level": "high", "stats": null}));
        assert_eq!(r.name(), "");
        assert_eq!(r.level(), None);
        assert_eq!(r.stats(), StatBlock::default());

        let r = record(json!({"name": "Mew", "stats": {"hp": "x", "atk": "10"}}));
        assert_eq!(r.stats().hp, None);
        assert_eq!(r.stats().atk, Some(10));
        assert_eq!(r.identity(), None);
    }

    #[test]
    fn serializes_back_to_the_same_object() {
        let input = json!({
            "name": "A",
            "level": "high",
            "gender": null,
            "type": "Fire",
            "friendship": 70.5,
            "stats": {"hp": 1, "xp": 12.5},
            "ribbons": ["gold"]
        });
        let out = serde_json::to_value(record(input.clone())).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(matches!(
            Record::try_from(json!([1, 2])),
            Err(EditorError::InvalidUpload(_))
        ));
    }

    #[test]
    fn empty_identity_counts_as_absent() {
        let mut r = Record::default().with(field::IDENTITY, "");
        assert_eq!(r.identity(), None);
        assert!(r.ensure_identity());
        assert!(r.identity().is_some());
        assert!(!r.ensure_identity());
    }

    #[test]
    fn numeric_identity_is_text() {
        let r = Record::default().with(field::IDENTITY, 42);
        assert_eq!(r.identity().as_deref(), Some("42"));
    }

    #[test]
    fn new_assigns_identity() {
        let a = Record::new("Eevee");
        let b = Record::new("Eevee");
        assert!(a.identity().is_some());
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn stat_block_value_skips_missing() {
        let stats = StatBlock {
            xp: Some(0),
            ..StatBlock::uniform(7)
        };
        assert_eq!(
            stats.to_value(),
            json!({"hp": 7, "atk": 7, "def": 7, "spa": 7, "spd": 7, "spe": 7, "xp": 0})
        );
        assert_eq!(StatBlock::from_value(&stats.to_value()), stats);
        assert_eq!(StatBlock::default().to_value(), json!({}));
    }
}
