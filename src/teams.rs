//! Team index: which students belong to which team number.

use crate::roster::{Person, PersonId, Roster};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Team numbers mapped to member handles in first-encounter order.
#[derive(Debug, Default)]
pub struct TeamIndex {
    teams: BTreeMap<i64, Vec<PersonId>>,
}

impl TeamIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `person` to `team`. Adding the same person twice is a no-op.
    pub fn add_member(&mut self, team: i64, person: PersonId) {
        let members = self.teams.entry(team).or_default();
        if !members.contains(&person) {
            members.push(person);
        }
    }

    /// Team numbers in ascending order.
    pub fn team_ids(&self) -> Vec<i64> {
        self.teams.keys().copied().collect()
    }

    pub fn contains(&self, team: i64) -> bool {
        self.teams.contains_key(&team)
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Total memberships across all teams.
    pub fn member_count(&self) -> usize {
        self.teams.values().map(Vec::len).sum()
    }

    /// Members of `team`, most hours first.
    ///
    /// Equal totals keep first-encounter order. Unknown teams give an empty list.
    pub fn members_of<'r>(&self, team: i64, roster: &'r Roster) -> Vec<&'r Person> {
        let mut members: Vec<&Person> = self
            .teams
            .get(&team)
            .map(|ids| ids.iter().filter_map(|&h| roster.get(h)).collect())
            .unwrap_or_default();
        members.sort_by(|a, b| by_hours_descending(a, b));
        members
    }

    pub fn clear(&mut self) {
        self.teams.clear();
    }
}

fn by_hours_descending(a: &Person, b: &Person) -> Ordering {
    b.hours().total_cmp(&a.hours())
}
