use std::collections::BTreeMap;

/// Explicit owner of a family of records with monotonic id allocation.
///
/// Ids are never reused, so a stale id held by a collaborator can only miss,
/// never alias a newer record.
#[derive(Clone, Debug)]
pub struct Registry<K, V> {
    next: u32,
    items: BTreeMap<K, V>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            next: 0,
            items: BTreeMap::new(),
        }
    }
}

impl<K: Copy + Ord + From<u32>, V> Registry<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an id and stores the record built for it.
    pub fn insert_with(&mut self, build: impl FnOnce(K) -> V) -> K {
        let id = K::from(self.next);
        self.next += 1;
        self.items.insert(id, build(id));
        id
    }

    pub fn remove(&mut self, id: K) -> Option<V> {
        self.items.remove(&id)
    }

    pub fn get(&self, id: K) -> Option<&V> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: K) -> Option<&mut V> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: K) -> bool {
        self.items.contains_key(&id)
    }

    /// Snapshot of the live ids, in ascending order.
    pub fn ids(&self) -> Vec<K> {
        self.items.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.items.iter().map(|(k, v)| (*k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.items.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.items.values_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
