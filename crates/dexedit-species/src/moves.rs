use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

pub const LEVEL_UP: &str = "level-up";

/// Maximum number of moves a record carries.
pub const MAX_MOVES: usize = 4;

/// A move a species can learn, with the level and method from the most
/// recent game version that lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnableMove {
    pub name: String,
    pub level: u32,
    pub method: String,
}

impl LearnableMove {
    pub fn is_level_up(&self) -> bool {
        self.method == LEVEL_UP
    }

    /// Human-readable label, e.g. `Thunder shock (Lv. 1)` or `Surf (TM/HM)`.
    pub fn label(&self) -> String {
        match self.method.as_str() {
            LEVEL_UP => format!("{} (Lv. {})", self.name, self.level),
            "machine" => format!("{} (TM/HM)", self.name),
            "egg" => format!("{} (Egg)", self.name),
            "tutor" => format!("{} (Tutor)", self.name),
            other => format!("{} ({other})", self.name),
        }
    }
}

/// Level-up moves first by ascending level, then the rest by method and name.
pub fn sort_moves(moves: &mut [LearnableMove]) {
    moves.sort_by(compare_moves);
}

fn compare_moves(a: &LearnableMove, b: &LearnableMove) -> Ordering {
    match (a.is_level_up(), b.is_level_up()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => a.level.cmp(&b.level),
        (false, false) => a.method.cmp(&b.method).then_with(|| a.name.cmp(&b.name)),
    }
}

/// The last [`MAX_MOVES`] level-up moves learnable at or below `level`.
/// `moves` must already be sorted.
pub fn suggested_moves(moves: &[LearnableMove], level: u32) -> Vec<String> {
    let learnable: Vec<&LearnableMove> = moves
        .iter()
        .filter(|m| m.is_level_up() && m.level <= level)
        .collect();
    let skip = learnable.len().saturating_sub(MAX_MOVES);
    learnable
        .into_iter()
        .skip(skip)
        .map(|m| m.name.clone())
        .collect()
}

/// [`suggested_moves`], falling back to the first [`MAX_MOVES`] moves of any
/// method when nothing is learnable by level yet.
pub fn default_moves(moves: &[LearnableMove], level: u32) -> Vec<String> {
    let suggested = suggested_moves(moves, level);
    if !suggested.is_empty() {
        return suggested;
    }
    moves.iter().take(MAX_MOVES).map(|m| m.name.clone()).collect()
}

/// `"thunder-shock"` → `"Thunder shock"`.
pub fn display_name(raw: &str) -> String {
    capitalize(&raw.replace('-', " "))
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(name: &str, level: u32, method: &str) -> LearnableMove {
        LearnableMove {
            name: name.to_string(),
            level,
            method: method.to_string(),
        }
    }

    #[test]
    fn sorts_level_up_first_then_by_method_and_name() {
        let mut moves = vec![
            mv("Surf", 0, "machine"),
            mv("Growl", 5, LEVEL_UP),
            mv("Charm", 0, "egg"),
            mv("Tackle", 1, LEVEL_UP),
            mv("Bide", 0, "egg"),
        ];
        sort_moves(&mut moves);
        let names: Vec<&str> = moves.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Tackle", "Growl", "Bide", "Charm", "Surf"]);
    }

    #[test]
    fn suggests_highest_four_learnable_moves() {
        let moves: Vec<_> = (1..=6).map(|l| mv(&format!("M{l}"), l * 5, LEVEL_UP)).collect();
        assert_eq!(suggested_moves(&moves, 25), vec!["M2", "M3", "M4", "M5"]);
        assert_eq!(suggested_moves(&moves, 7), vec!["M1"]);
    }

    #[test]
    fn falls_back_to_any_method() {
        let moves = vec![mv("Growl", 10, LEVEL_UP), mv("Surf", 0, "machine")];
        assert!(suggested_moves(&moves, 1).is_empty());
        assert_eq!(default_moves(&moves, 1), vec!["Growl", "Surf"]);
    }

    #[test]
    fn labels_by_method() {
        assert_eq!(mv("Tackle", 1, LEVEL_UP).label(), "Tackle (Lv. 1)");
        assert_eq!(mv("Surf", 0, "machine").label(), "Surf (TM/HM)");
        assert_eq!(mv("Charm", 0, "egg").label(), "Charm (Egg)");
        assert_eq!(mv("Snore", 0, "tutor").label(), "Snore (Tutor)");
        assert_eq!(mv("Volt Tackle", 0, "light-ball-egg").label(), "Volt Tackle (light-ball-egg)");
    }

    #[test]
    fn formats_display_names() {
        assert_eq!(display_name("thunder-shock"), "Thunder shock");
        assert_eq!(display_name(""), "");
    }
}
