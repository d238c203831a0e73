//! Equivalence policies: how a record maps to its grouping key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EditorError;
use crate::models::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupMode {
    /// Shared identity, or identical name, level and all six core stats.
    #[default]
    Strict,
    /// Same name and level, regardless of stats.
    Loose,
}

impl DedupMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Strict => "identical individual_id or exact same stats + name + level",
            Self::Loose => "same name + level (regardless of stats)",
        }
    }
}

impl fmt::Display for DedupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupMode {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "loose" => Ok(Self::Loose),
            other => Err(EditorError::ConfigError(format!(
                "unknown dedup mode '{other}', expected 'strict' or 'loose'"
            ))),
        }
    }
}

/// Grouping key for `record` under `mode`. Total: missing fields render as
/// empty components rather than failing.
///
/// Without an identity the key is a compact JSON array of the components,
/// e.g. `["Pika",5,35,50,50,50,50,50]`, so names containing separators or
/// negative numbers cannot make two different records collide.
pub fn grouping_key(record: &Record, mode: DedupMode) -> String {
    match mode {
        DedupMode::Strict => match record.identity() {
            Some(identity) => identity.into_owned(),
            None => {
                let mut parts = Vec::with_capacity(8);
                parts.push(Value::from(record.name().into_owned()));
                parts.push(component(record.level()));
                parts.extend(record.stats().core().into_iter().map(component));
                Value::Array(parts).to_string()
            }
        },
        DedupMode::Loose => Value::Array(vec![
            Value::from(record.name().into_owned()),
            component(record.level()),
        ])
        .to_string(),
    }
}

fn component(value: Option<i64>) -> Value {
    value.map_or_else(|| Value::from(""), Value::from)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{StatBlock, field};

    fn record(name: &str, level: i64, hp: i64) -> Record {
        let stats = StatBlock {
            hp: Some(hp),
            ..StatBlock::uniform(50)
        };
        Record::default()
            .with(field::NAME, name)
            .with(field::LEVEL, level)
            .with(field::STATS, stats.to_value())
    }

    #[test]
    fn strict_key_uses_name_level_and_stats() {
        let key = grouping_key(&record("Pika", 5, 35), DedupMode::Strict);
        assert_eq!(key, r#"["Pika",5,35,50,50,50,50,50]"#);
    }

    #[test]
    fn strict_key_prefers_identity() {
        let r = record("Pika", 5, 35).with(field::IDENTITY, "abc-123");
        assert_eq!(grouping_key(&r, DedupMode::Strict), "abc-123");
    }

    #[test]
    fn loose_key_ignores_identity_and_stats() {
        let r = record("Pika", 5, 35).with(field::IDENTITY, "abc-123");
        assert_eq!(grouping_key(&r, DedupMode::Loose), r#"["Pika",5]"#);
    }

    #[test]
    fn missing_fields_degrade_to_empty_components() {
        let r = Record::default().with(field::NAME, "Ditto");
        assert_eq!(
            grouping_key(&r, DedupMode::Strict),
            r#"["Ditto","","","","","","",""]"#
        );
        assert_eq!(grouping_key(&r, DedupMode::Loose), r#"["Ditto",""]"#);
    }

    #[test]
    fn hyphens_and_negative_numbers_do_not_collide() {
        let a = Record::try_from(json!({"name": "A-", "level": 5})).unwrap();
        let b = Record::try_from(json!({"name": "A", "level": -5})).unwrap();
        for mode in [DedupMode::Strict, DedupMode::Loose] {
            assert_ne!(grouping_key(&a, mode), grouping_key(&b, mode));
        }

        let c = Record::try_from(json!({"name": "A", "level": 5, "stats": {"hp": -1}})).unwrap();
        let d = Record::try_from(json!({"name": "A", "level": "", "stats": {"hp": 5}})).unwrap();
        assert_ne!(grouping_key(&c, DedupMode::Strict), grouping_key(&d, DedupMode::Strict));
    }

    #[test]
    fn numeric_strings_match_numbers() {
        let a = Record::try_from(json!({"name": "A", "level": "5"})).unwrap();
        let b = Record::try_from(json!({"name": "A", "level": 5.0})).unwrap();
        assert_eq!(grouping_key(&a, DedupMode::Loose), grouping_key(&b, DedupMode::Loose));
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("strict".parse::<DedupMode>().unwrap(), DedupMode::Strict);
        assert_eq!(" Loose ".parse::<DedupMode>().unwrap(), DedupMode::Loose);
        assert!("fuzzy".parse::<DedupMode>().is_err());
    }
}
