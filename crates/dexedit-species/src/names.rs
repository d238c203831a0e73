use std::collections::HashMap;

/// Species offered by the creation form, keyed by zero-padded dex id.
const BUILTIN: &[(&str, &str)] = &[
    ("001", "Bulbasaur"),
    ("002", "Ivysaur"),
    ("003", "Venusaur"),
    ("004", "Charmander"),
    ("005", "Charmeleon"),
    ("006", "Charizard"),
    ("007", "Squirtle"),
    ("008", "Wartortle"),
    ("009", "Blastoise"),
    ("025", "Pikachu"),
    ("026", "Raichu"),
    ("150", "Mewtwo"),
    ("151", "Mew"),
    ("152", "Chikorita"),
    ("155", "Cyndaquil"),
    ("158", "Totodile"),
    ("172", "Pichu"),
    ("196", "Espeon"),
    ("197", "Umbreon"),
    ("249", "Lugia"),
    ("250", "Ho-Oh"),
    ("251", "Celebi"),
    ("252", "Treecko"),
    ("255", "Torchic"),
    ("258", "Mudkip"),
    ("384", "Rayquaza"),
    ("493", "Arceus"),
];

/// `25` → `"025"`.
pub fn dex_id_from_number(number: u32) -> String {
    format!("{number:03}")
}

/// `"025"` → `Some(25)`.
pub fn number_from_dex_id(dex_id: &str) -> Option<u32> {
    dex_id.trim().parse().ok()
}

/// Lookup table from dex id to species name.
#[derive(Debug, Clone, Default)]
pub struct SpeciesNames {
    names: HashMap<String, String>,
}

impl SpeciesNames {
    pub fn builtin() -> Self {
        BUILTIN.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, dex_id: &str) -> Option<&str> {
        self.names.get(dex_id).map(String::as_str)
    }

    pub fn by_number(&self, number: u32) -> Option<&str> {
        self.get(&dex_id_from_number(number))
    }

    /// `(dex id, name)` pairs ordered by numeric id.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .names
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
            .collect();
        entries.sort_by_key(|(id, _)| number_from_dex_id(id).unwrap_or(u32::MAX));
        entries
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for SpeciesNames {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        }
    }
}
