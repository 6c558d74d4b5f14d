//! Keyed reconciliation of server snapshots against long-lived local mirrors.

use shared::{CatRecord, EntityId, MiceRecord};
use std::collections::{HashMap, HashSet};

/// A snapshot record that carries its own server id.
pub trait Identified {
    fn id(&self) -> EntityId;
}

impl Identified for MiceRecord {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Identified for CatRecord {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Local objects keyed by server id, created on first sighting and dropped
/// once a snapshot no longer mentions them.
pub struct EntityMap<T> {
    entries: HashMap<EntityId, T>,
    factory: Box<dyn Fn() -> T + Send>,
}

impl<T> EntityMap<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + 'static,
    {
        Self {
            entries: HashMap::new(),
            factory: Box::new(factory),
        }
    }

    /// Applies one snapshot.
    ///
    /// Items whose id is in `ignore` are passed to `apply` with `None` and
    /// never stored. Every other item is applied to its local object, which
    /// is created first if needed. Removal only scans the map when the item
    /// count does not add up, so ids within `items` must be pairwise
    /// distinct; a snapshot with duplicate ids is a caller error.
    pub fn reconcile<R, F>(&mut self, items: &[R], mut apply: F, ignore: &HashSet<EntityId>)
    where
        R: Identified,
        F: FnMut(&R, Option<&mut T>),
    {
        debug_assert!(
            has_distinct_ids(items),
            "snapshot contains duplicate entity ids"
        );

        for item in items {
            let id = item.id();
            if ignore.contains(&id) {
                apply(item, None);
                continue;
            }

            let local = self.entries.entry(id).or_insert_with(|| (self.factory)());
            apply(item, Some(local));
        }

        if items.len() != self.entries.len() + ignore.len() {
            let live: HashSet<EntityId> = items.iter().map(Identified::id).collect();
            self.entries.retain(|id, _| live.contains(id));
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &T)> {
        self.entries.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }
}

fn has_distinct_ids<R: Identified>(items: &[R]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().all(|item| seen.insert(item.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct Record(EntityId, i32);

    impl Identified for Record {
        fn id(&self) -> EntityId {
            self.0
        }
    }

    #[derive(Debug, PartialEq)]
    struct Mirror {
        serial: u32,
        value: i32,
    }

    fn map() -> EntityMap<Mirror> {
        let serials = Arc::new(AtomicU32::new(0));
        EntityMap::new(move || Mirror {
            serial: serials.fetch_add(1, Ordering::SeqCst),
            value: 0,
        })
    }

    fn store(record: &Record, mirror: Option<&mut Mirror>) {
        if let Some(mirror) = mirror {
            mirror.value = record.1;
        }
    }

    #[test]
    fn test_creates_on_first_sighting() {
        let mut entities = map();
        entities.reconcile(&[Record(1, 10), Record(2, 20)], store, &HashSet::new());

        assert_eq!(entities.len(), 2);
        assert_eq!(entities.get(2).unwrap().value, 20);
    }

    #[test]
    fn test_same_snapshot_twice_is_idempotent() {
        let mut entities = map();
        let snapshot = [Record(1, 10), Record(2, 20)];
        entities.reconcile(&snapshot, store, &HashSet::new());
        entities.reconcile(&snapshot, store, &HashSet::new());

        assert_eq!(entities.len(), 2);
        assert_eq!(entities.get(1), Some(&Mirror { serial: 0, value: 10 }));
        assert_eq!(entities.get(2), Some(&Mirror { serial: 1, value: 20 }));
    }

    #[test]
    fn test_missing_ids_are_deleted_and_others_kept() {
        let mut entities = map();
        entities.reconcile(&[Record(1, 10), Record(2, 20)], store, &HashSet::new());
        entities.reconcile(&[Record(1, 11)], store, &HashSet::new());

        assert!(!entities.contains(2));
        assert_eq!(entities.get(1), Some(&Mirror { serial: 0, value: 11 }));
    }

    #[test]
    fn test_ignored_ids_notify_without_storing() {
        let mut entities = map();
        let ignore: HashSet<EntityId> = [7].into_iter().collect();
        let mut notified = Vec::new();

        entities.reconcile(
            &[Record(7, 70), Record(8, 80)],
            |record, mirror| {
                if mirror.is_none() {
                    notified.push(record.1);
                }
                store(record, mirror);
            },
            &ignore,
        );

        assert_eq!(notified, vec![70]);
        assert!(!entities.contains(7));
        assert_eq!(entities.len(), 1);
    }

    #[test]
    fn test_replacement_with_same_count_is_detected() {
        let mut entities = map();
        entities.reconcile(&[Record(1, 1), Record(2, 2)], store, &HashSet::new());
        entities.reconcile(&[Record(1, 1), Record(3, 3)], store, &HashSet::new());

        assert!(entities.contains(3));
        assert!(!entities.contains(2));
    }

    #[test]
    fn test_empty_snapshot_clears_map() {
        let mut entities = map();
        entities.reconcile(&[Record(1, 1)], store, &HashSet::new());
        entities.reconcile::<Record, _>(&[], store, &HashSet::new());
        assert!(entities.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "duplicate entity ids")]
    fn test_duplicate_ids_are_rejected_in_debug_builds() {
        let mut entities = map();
        entities.reconcile(&[Record(1, 1), Record(1, 2)], store, &HashSet::new());
    }
}
