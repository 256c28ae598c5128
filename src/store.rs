use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{Result, TableError};

pub const MIN_NAME_LENGTH: usize = 3;
pub const MAX_NAME_LENGTH: usize = 16;

/// Positional slot of an entry. Assigned on insert, never reused.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntryId {
    fn from(id: u64) -> Self {
        EntryId(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Live(String),
    Tombstone,
}

/// Bounds on the trimmed length of a name, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameLimits {
    pub min: usize,
    pub max: usize,
}

impl Default for NameLimits {
    fn default() -> Self {
        NameLimits {
            min: MIN_NAME_LENGTH,
            max: MAX_NAME_LENGTH,
        }
    }
}

impl NameLimits {
    pub fn check(&self, name: &str) -> Result<()> {
        let length = name.trim().chars().count();
        if length < self.min || length > self.max {
            return Err(TableError::InvalidLength {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Ordered list of names indexed by slot.
///
/// Deleting an entry leaves a [`Slot::Tombstone`] behind, so ids of the
/// remaining entries never shift and a deleted id is never handed out again.
#[derive(Debug, Clone, Default)]
pub struct ListStore {
    slots: Vec<Slot>,
    limits: NameLimits,
}

impl ListStore {
    pub fn new(limits: NameLimits) -> Self {
        Self {
            slots: Vec::new(),
            limits,
        }
    }

    /// Create a store pre-populated with `names`, validated like inserts.
    pub fn with_names<I, S>(limits: NameLimits, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new(limits);
        for name in names {
            store.insert(name.as_ref())?;
        }
        Ok(store)
    }

    pub fn limits(&self) -> NameLimits {
        self.limits
    }

    /// Id the next successful insert will receive.
    pub fn next_id(&self) -> EntryId {
        EntryId(self.slots.len() as u64)
    }

    pub fn slot(&self, id: EntryId) -> Option<&Slot> {
        usize::try_from(id.0)
            .ok()
            .and_then(|index| self.slots.get(index))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(slot, Slot::Live(live) if live == name))
    }

    /// Append `name` at the next id, stored as given.
    ///
    /// Duplicates are compared on the raw name and rejected before the
    /// length check; only the length check trims.
    pub fn insert(&mut self, name: &str) -> Result<EntryId> {
        if self.contains_name(name) {
            return Err(TableError::DuplicateName(name.to_owned()));
        }
        self.limits.check(name)?;

        let id = self.next_id();
        self.slots.push(Slot::Live(name.to_owned()));
        log::debug!("stored {} at slot {}", name, id);
        Ok(id)
    }

    pub fn get(&self, id: EntryId) -> Result<&str> {
        match self.slot(id) {
            Some(Slot::Live(name)) => Ok(name),
            _ => Err(TableError::unknown_id(id)),
        }
    }

    /// Tombstone the slot at `id` and hand back the name it held.
    pub fn remove(&mut self, id: EntryId) -> Result<String> {
        let slot = usize::try_from(id.0)
            .ok()
            .and_then(|index| self.slots.get_mut(index))
            .ok_or_else(|| TableError::unknown_id(id))?;

        match std::mem::replace(slot, Slot::Tombstone) {
            Slot::Live(name) => {
                log::debug!("tombstoned slot {} ({})", id, name);
                Ok(name)
            }
            Slot::Tombstone => Err(TableError::unknown_id(id)),
        }
    }

    /// Live entries in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Live(name) => Some(Entry {
                    id: EntryId(index as u64),
                    name: name.clone(),
                }),
                Slot::Tombstone => None,
            })
    }

    pub fn live_len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Live(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.live_len() == 0
    }

    /// All live entries as `"0: Jacoby, 2: Miklos"`.
    pub fn describe(&self) -> Result<String> {
        if self.is_empty() {
            return Err(TableError::EmptyStore);
        }
        Ok(self.entries().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    fn seeded() -> ListStore {
        ListStore::with_names(
            NameLimits::default(),
            ["Jacoby", "Andrew", "Miklos"],
        )
        .unwrap()
    }

    #[rstest]
    #[case("ab", false)]
    #[case("abc", true)]
    #[case("abcdefghijklmnop", true)]
    #[case("abcdefghijklmnopq", false)]
    #[case("   ab   ", false)]
    #[case("  abc ", true)]
    #[case("", false)]
    #[case("ééé", true)]
    fn name_length_is_checked_on_trimmed_chars(
        #[case] name: &str,
        #[case] accepted: bool,
    ) {
        let mut store = ListStore::default();
        let result = store.insert(name);
        assert_eq!(result.is_ok(), accepted, "{:?}", result);
        if !accepted {
            assert!(matches!(result, Err(TableError::InvalidLength { .. })));
            assert_eq!(store.next_id(), EntryId(0));
        }
    }

    #[test]
    fn insert_appends_at_next_id() {
        let mut store = seeded();
        assert_eq!(store.insert("Bob").unwrap(), EntryId(3));
        assert_eq!(store.get(EntryId(3)).unwrap(), "Bob");
    }

    #[test]
    fn duplicate_is_rejected_without_consuming_an_id() {
        let mut store = seeded();
        let err = store.insert("Andrew").unwrap_err();
        assert!(matches!(
            err,
            TableError::DuplicateName(ref name) if name == "Andrew"
        ));
        assert_eq!(store.live_len(), 3);
        assert_eq!(store.next_id(), EntryId(3));
    }

    #[test]
    fn names_are_compared_and_stored_untrimmed() {
        let mut store = seeded();
        assert_eq!(store.insert(" Andrew ").unwrap(), EntryId(3));
        assert_eq!(store.get(EntryId(3)).unwrap(), " Andrew ");
        assert_eq!(store.insert("  Bob  ").unwrap(), EntryId(4));
        assert_eq!(store.get(EntryId(4)).unwrap(), "  Bob  ");
        assert!(store.contains_name("Andrew"));
        assert!(!store.contains_name("Bob"));
    }

    #[test]
    fn removed_slot_is_tombstoned_and_never_reused() {
        let mut store = seeded();
        assert_eq!(store.remove(EntryId(1)).unwrap(), "Andrew");
        assert_eq!(store.slot(EntryId(1)), Some(&Slot::Tombstone));
        assert!(matches!(
            store.get(EntryId(1)),
            Err(TableError::UnknownId(_))
        ));
        assert!(matches!(
            store.remove(EntryId(1)),
            Err(TableError::UnknownId(_))
        ));
        assert_eq!(store.insert("Andrew").unwrap(), EntryId(3));
    }

    #[test]
    fn out_of_range_id_is_unknown() {
        let mut store = seeded();
        assert!(matches!(
            store.remove(EntryId(42)),
            Err(TableError::UnknownId(ref id)) if id == "42"
        ));
        assert_eq!(store.live_len(), 3);
    }

    #[test]
    fn describe_lists_live_entries_in_order() {
        let mut store = seeded();
        store.remove(EntryId(1)).unwrap();
        assert_eq!(store.describe().unwrap(), "0: Jacoby, 2: Miklos");
    }

    #[test]
    fn describe_empty_store_fails() {
        let mut store = ListStore::default();
        assert!(matches!(store.describe(), Err(TableError::EmptyStore)));
        store.insert("Solo").unwrap();
        assert_eq!(store.describe().unwrap(), "0: Solo");
        store.remove(EntryId(0)).unwrap();
        assert!(matches!(store.describe(), Err(TableError::EmptyStore)));
    }

    #[test]
    fn invalid_seed_fails_construction() {
        let result =
            ListStore::with_names(NameLimits::default(), ["Jacoby", "Al"]);
        assert!(matches!(result, Err(TableError::InvalidLength { .. })));
    }

    #[quickcheck]
    fn prop_ids_strictly_increase(ops: Vec<(bool, u8)>) -> bool {
        let mut store = ListStore::default();
        let mut last: Option<EntryId> = None;
        for (insert, key) in ops {
            if insert {
                if let Ok(id) = store.insert(&format!("name{}", key)) {
                    if last.map_or(false, |last| id <= last) {
                        return false;
                    }
                    last = Some(id);
                }
            } else {
                let _ = store.remove(EntryId(u64::from(key) % 8));
            }
        }
        let ordered = store
            .entries()
            .tuple_windows()
            .all(|(a, b)| a.id < b.id);
        ordered
    }

    #[quickcheck]
    fn prop_repeated_get_is_stable(names: Vec<u8>) -> bool {
        let mut store = ListStore::default();
        for key in names {
            let _ = store.insert(&format!("user{}", key));
        }
        let stable = store.entries().all(|entry| {
            let first = store.get(entry.id).map(str::to_owned).ok();
            let second = store.get(entry.id).map(str::to_owned).ok();
            first.is_some() && first == second
        });
        stable
    }
}
