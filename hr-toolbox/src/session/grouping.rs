// Random grouping: shuffle the roster and cut it into fixed-size groups.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::roster::Participant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupingError {
    #[error("add participants before grouping")]
    EmptyRoster,

    #[error("group size must be at least 1, got {0}")]
    InvalidGroupSize(usize),
}

/// One group produced by a grouping run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<Participant>,
}

/// Default label for the group at 0-based position `index`.
pub fn default_group_name(index: usize) -> String {
    format!("Group {}", index + 1)
}

pub struct GroupingEngine {
    rng: SmallRng,
}

impl Default for GroupingEngine {
    fn default() -> Self {
        GroupingEngine {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl GroupingEngine {
    pub fn seeded(seed: u64) -> Self {
        GroupingEngine {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Partition `roster` into randomly assigned groups of `group_size`.
    ///
    /// The roster is permuted with a Fisher-Yates shuffle (every ordering
    /// equally likely) and cut into consecutive chunks; the final group holds
    /// the remainder. Groups are named `Group 1`, `Group 2`, ...
    pub fn group(
        &mut self,
        roster: &[Participant],
        group_size: usize,
    ) -> Result<Vec<Group>, GroupingError> {
        if roster.is_empty() {
            return Err(GroupingError::EmptyRoster);
        }
        if group_size == 0 {
            return Err(GroupingError::InvalidGroupSize(group_size));
        }

        let mut shuffled = roster.to_vec();
        shuffled.shuffle(&mut self.rng);

        let groups: Vec<Group> = shuffled
            .chunks(group_size)
            .enumerate()
            .map(|(idx, chunk)| Group {
                id: Uuid::new_v4(),
                name: default_group_name(idx),
                members: chunk.to_vec(),
            })
            .collect();

        info!(
            "Grouped {} participants into {} groups of up to {}",
            roster.len(),
            groups.len(),
            group_size
        );
        Ok(groups)
    }
}

/// Apply suggested names positionally.
///
/// `candidates[k]` renames `groups[k]` when present and non-blank; groups
/// beyond the end of the candidate list keep their current name. Returns how
/// many groups were renamed.
pub fn apply_candidate_names(groups: &mut [Group], candidates: &[String]) -> usize {
    let mut renamed = 0;
    for (group, candidate) in groups.iter_mut().zip(candidates) {
        let candidate = candidate.trim();
        if !candidate.is_empty() {
            group.name = candidate.to_string();
            renamed += 1;
        }
    }
    renamed
}

/// Reset every group to its default `Group <k>` label.
pub fn apply_fallback_names(groups: &mut [Group]) {
    for (idx, group) in groups.iter_mut().enumerate() {
        group.name = default_group_name(idx);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::session::roster::Roster;

    fn roster(n: usize) -> Roster {
        Roster::from_names((0..n).map(|i| format!("P{i}")))
    }

    #[test]
    fn five_into_pairs() {
        let r = Roster::from_names(["A", "B", "C", "D", "E"]);
        let groups = GroupingEngine::seeded(1).group(r.participants(), 2).unwrap();

        let sizes: Vec<usize> = groups.iter().map(|g| g.members.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let mut members: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.members.iter().map(|m| m.name.as_str()))
            .collect();
        members.sort();
        assert_eq!(members, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn group_count_and_partition_properties() {
        let mut engine = GroupingEngine::seeded(99);
        for n in 1..=23 {
            let r = roster(n);
            for g in 1..=n + 2 {
                let groups = engine.group(r.participants(), g).unwrap();
                assert_eq!(groups.len(), n.div_ceil(g), "n={n} g={g}");

                let total: usize = groups.iter().map(|grp| grp.members.len()).sum();
                assert_eq!(total, n);

                for grp in &groups[..groups.len() - 1] {
                    assert_eq!(grp.members.len(), g);
                }
                let last = groups.last().unwrap().members.len();
                assert!(last >= 1 && last <= g);

                let ids: HashSet<Uuid> = groups
                    .iter()
                    .flat_map(|grp| grp.members.iter().map(|m| m.id))
                    .collect();
                let all: HashSet<Uuid> = r.participants().iter().map(|p| p.id).collect();
                assert_eq!(ids, all);
            }
        }
    }

    #[test]
    fn default_names_follow_position() {
        let r = roster(7);
        let groups = GroupingEngine::seeded(3).group(r.participants(), 3).unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Group 1", "Group 2", "Group 3"]);
    }

    #[test]
    fn group_ids_are_fresh_each_run() {
        let r = roster(4);
        let mut engine = GroupingEngine::seeded(3);
        let first: HashSet<Uuid> = engine
            .group(r.participants(), 2)
            .unwrap()
            .iter()
            .map(|g| g.id)
            .collect();
        let second: HashSet<Uuid> = engine
            .group(r.participants(), 2)
            .unwrap()
            .iter()
            .map(|g| g.id)
            .collect();
        assert!(first.is_disjoint(&second));
    }

    #[test]
    fn rejects_empty_roster() {
        let err = GroupingEngine::seeded(1).group(&[], 3).unwrap_err();
        assert_eq!(err, GroupingError::EmptyRoster);
    }

    #[test]
    fn rejects_zero_group_size() {
        let r = roster(3);
        let err = GroupingEngine::seeded(1).group(r.participants(), 0).unwrap_err();
        assert_eq!(err, GroupingError::InvalidGroupSize(0));
    }

    #[test]
    fn group_size_larger_than_roster_gives_one_group() {
        let r = roster(3);
        let groups = GroupingEngine::seeded(1).group(r.participants(), 10).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 3);
    }

    #[test]
    fn shuffle_is_unbiased_over_small_roster() {
        // 3 entrants in one group: each of the 6 orderings should show up
        // about equally often.
        let r = Roster::from_names(["A", "B", "C"]);
        let mut engine = GroupingEngine::seeded(2024);
        let mut counts: HashMap<String, usize> = HashMap::new();
        let runs = 6000;
        for _ in 0..runs {
            let groups = engine.group(r.participants(), 3).unwrap();
            let order: String = groups[0].members.iter().map(|m| m.name.as_str()).collect();
            *counts.entry(order).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 6);
        for (order, count) in counts {
            assert!(
                (800..=1200).contains(&count),
                "ordering {order} seen {count} times out of {runs}"
            );
        }
    }

    #[test]
    fn candidate_names_apply_positionally() {
        let r = roster(6);
        let mut groups = GroupingEngine::seeded(1).group(r.participants(), 2).unwrap();
        let members_before: Vec<Vec<Participant>> =
            groups.iter().map(|g| g.members.clone()).collect();

        let renamed = apply_candidate_names(&mut groups, &["Falcons".into(), "Otters".into()]);
        assert_eq!(renamed, 2);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Falcons", "Otters", "Group 3"]);

        // Membership is never touched by naming
        let members_after: Vec<Vec<Participant>> =
            groups.iter().map(|g| g.members.clone()).collect();
        assert_eq!(members_before, members_after);
    }

    #[test]
    fn blank_candidates_keep_existing_name() {
        let r = roster(4);
        let mut groups = GroupingEngine::seeded(1).group(r.participants(), 2).unwrap();
        let renamed = apply_candidate_names(&mut groups, &["  ".into(), "Owls".into(), "Extra".into()]);
        assert_eq!(renamed, 1);
        assert_eq!(groups[0].name, "Group 1");
        assert_eq!(groups[1].name, "Owls");
    }

    #[test]
    fn fallback_names_restore_defaults() {
        let r = roster(5);
        let mut groups = GroupingEngine::seeded(1).group(r.participants(), 2).unwrap();
        apply_candidate_names(&mut groups, &["X".into(), "Y".into(), "Z".into()]);
        apply_fallback_names(&mut groups);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Group 1", "Group 2", "Group 3"]);
    }
}
