//! Identity registry: one accumulated-hours record per student id.
//!
//! Every export row that mentions an id adds its hours to the same record,
//! so duplicated scanner rows collapse into a single running total. The
//! registry is an ordinary value owned by the caller; dropping it or calling
//! [`Roster::reset`] starts a fresh run.

use std::collections::HashMap;
use std::fmt;

/// Handle to a [`Person`] held by a [`Roster`].
///
/// Handles are only meaningful for the roster that issued them and are
/// invalidated by [`Roster::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(usize);

/// A student with hours summed across every row seen for their id.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    id: String,
    last_name: String,
    first_name: String,
    hours: f64,
}

impl Person {
    fn new(name: &str, id: &str, hours: f64) -> Self {
        let (last_name, first_name) = split_name(name);
        Self {
            id: id.to_string(),
            last_name,
            first_name,
            hours,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Display name as it appears on the coaches sheet: `"Last, First"`.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    pub fn hours(&self) -> f64 {
        self.hours
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {}:{}:{}]",
            self.first_name, self.last_name, self.id, self.hours
        )
    }
}

/// Split a free-form name into `(last, first)`.
///
/// Exports use two conventions: `"Last, First"` and `"First Last"`. The
/// comma form puts the surname on the left, the space form puts it on the
/// right. A name with neither separator is taken as a bare surname.
pub fn split_name(name: &str) -> (String, String) {
    if let Some((last, first)) = name.split_once(", ") {
        (last.to_string(), first.to_string())
    } else if let Some((first, last)) = name.split_once(' ') {
        (last.to_string(), first.to_string())
    } else {
        (name.to_string(), String::new())
    }
}

/// Registry of every person seen in the current run, keyed by id.
#[derive(Debug, Default)]
pub struct Roster {
    people: Vec<Person>,
    by_id: HashMap<String, PersonId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hours` for `id`, creating the person on first sighting.
    ///
    /// Later sightings only add to the total; the name given with them is
    /// ignored. No sign check is made on `hours`.
    pub fn resolve(&mut self, name: &str, id: &str, hours: f64) -> PersonId {
        if let Some(&handle) = self.by_id.get(id) {
            self.people[handle.0].hours += hours;
            return handle;
        }
        let handle = PersonId(self.people.len());
        self.people.push(Person::new(name, id, hours));
        self.by_id.insert(id.to_string(), handle);
        handle
    }

    pub fn get(&self, handle: PersonId) -> Option<&Person> {
        self.people.get(handle.0)
    }

    pub fn find(&self, id: &str) -> Option<&Person> {
        self.by_id.get(id).and_then(|&h| self.get(h))
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Forget every person. Handles issued before the reset must not be reused.
    pub fn reset(&mut self) {
        self.people.clear();
        self.by_id.clear();
    }
}
