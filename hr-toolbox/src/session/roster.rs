// Participant roster: text import, mock names, removal, duplicate handling.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Built-in demo roster appended by `Roster::add_from_mock_set`.
pub const MOCK_NAMES: &[&str] = &[
    "王小明", "李美玲", "張大衛", "林淑芬", "陳志強",
    "黃雅婷", "周傑倫", "蔡依林", "吳宗憲", "楊丞琳",
    "劉德華", "張學友", "郭富城", "黎明", "林青霞",
    "王祖賢", "鍾楚紅", "關之琳", "張曼玉", "梁朝偉",
];

/// A registered event participant.
///
/// Identity is the `id`; two participants may share a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
}

impl Participant {
    /// Create a participant with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Participant {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// The ordered participant list.
///
/// Every mutating method builds the complete new sequence and swaps it in,
/// then bumps `revision`. Consumers compare revisions to tell whether a
/// snapshot they hold is still current.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    participants: Vec<Participant>,
    revision: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from names, in order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Roster {
            participants: names.into_iter().map(Participant::new).collect(),
            revision: 0,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Append one participant per non-empty token in `raw`.
    ///
    /// Tokens are separated by newlines and/or commas and trimmed. Returns the
    /// number of participants added; when nothing survives the roster is left
    /// untouched (and its revision unchanged).
    pub fn add_from_text(&mut self, raw: &str) -> usize {
        let names = parse_names(raw);
        self.append(names)
    }

    /// Append the built-in mock names. Never deduplicates.
    pub fn add_from_mock_set(&mut self) -> usize {
        self.append(MOCK_NAMES.iter().map(|n| n.to_string()).collect())
    }

    /// Remove the participant with the given id. Absent ids are a no-op.
    ///
    /// Returns whether a participant was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        if !self.participants.iter().any(|p| p.id == id) {
            return false;
        }
        let next: Vec<Participant> = self
            .participants
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        self.replace(next);
        true
    }

    /// Empty the roster. Returns how many participants were dropped.
    ///
    /// Callers are responsible for obtaining user confirmation first.
    pub fn clear(&mut self) -> usize {
        let dropped = self.participants.len();
        self.replace(Vec::new());
        dropped
    }

    /// Names that occur more than once.
    pub fn duplicate_names(&self) -> BTreeSet<String> {
        compute_duplicate_names(&self.participants)
    }

    /// Collapse duplicate names, keeping the first occurrence of each.
    ///
    /// Returns the number of participants dropped.
    pub fn dedupe(&mut self) -> usize {
        let next = dedupe(&self.participants);
        let dropped = self.participants.len() - next.len();
        if dropped > 0 {
            self.replace(next);
        }
        dropped
    }

    fn append(&mut self, names: Vec<String>) -> usize {
        if names.is_empty() {
            return 0;
        }
        let added = names.len();
        let mut next = self.participants.clone();
        next.extend(names.into_iter().map(Participant::new));
        self.replace(next);
        added
    }

    fn replace(&mut self, participants: Vec<Participant>) {
        self.participants = participants;
        self.revision += 1;
    }
}

/// Split free-form text into trimmed, non-empty names.
///
/// Separators are `\n` and `,`; runs of separators produce no empty names.
pub fn parse_names(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every name appearing at least twice in `participants`.
pub fn compute_duplicate_names(participants: &[Participant]) -> BTreeSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for p in participants {
        *counts.entry(p.name.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Keep only the first participant for each distinct name, in order.
pub fn dedupe(participants: &[Participant]) -> Vec<Participant> {
    let mut seen: HashSet<&str> = HashSet::new();
    participants
        .iter()
        .filter(|p| seen.insert(p.name.as_str()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
