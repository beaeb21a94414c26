use crate::skiplist::list::{Iter, IterReverse, RankedSkipList};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// An ordered set of key-value pairs, unique by key, implemented by a ranked
/// skiplist and an auxiliary key-indexed map.
///
/// The skiplist keeps every pair sorted by value in ascending order with ties
/// broken by key, and addressable by 1-based rank. The auxiliary map answers
/// key lookups without touching the skiplist, and supplies the value a key is
/// currently associated with whenever a mutation has to locate the pair
/// inside the skiplist. Every mutation updates both structures, so their
/// contents are always identical.
///
/// This is the contract of a leaderboard: re-scoring a key never requires the
/// caller to know the old value.
///
/// # Examples
/// ```
/// use ranked_collections::skiplist::RankedSet;
///
/// let mut set = RankedSet::new();
/// set.insert("alice", 50);
/// set.insert("bob", 30);
///
/// assert_eq!(set.rank_of(&"bob"), Some(1));
/// assert_eq!(set.get(&"alice"), Some(&50));
///
/// set.insert("bob", 70);
/// assert_eq!(set.rank_of(&"bob"), Some(2));
///
/// assert_eq!(set.remove(&"bob"), Some(70));
/// assert_eq!(set.len(), 1);
/// ```
pub struct RankedSet<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    list: RankedSkipList<K, V>,
    map: BTreeMap<K, V>,
}

impl<K, V> RankedSet<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    /// Constructs a new, empty `RankedSet<K, V>`.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let set: RankedSet<u32, u32> = RankedSet::new();
    /// ```
    pub fn new() -> Self {
        RankedSet {
            list: RankedSkipList::new(),
            map: BTreeMap::new(),
        }
    }

    /// Constructs a new, empty `RankedSet<K, V>` whose skiplist uses a
    /// specific maximum level and branch probability.
    ///
    /// # Panics
    /// Panics if `max_level` is zero, or if `branch_prob_percent` is outside
    /// of `[1, 99]`.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let set: RankedSet<u32, u32> = RankedSet::with_config(16, 50);
    /// ```
    pub fn with_config(max_level: usize, branch_prob_percent: u32) -> Self {
        RankedSet {
            list: RankedSkipList::with_config(max_level, branch_prob_percent),
            map: BTreeMap::new(),
        }
    }

    /// Inserts a key-value pair into the set. If the key already exists, the
    /// pair is relocated to the sorted position of the new value and the old
    /// value is returned; the caller never supplies the old value.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// assert_eq!(set.insert("a", 1), None);
    /// assert_eq!(set.insert("a", 2), Some(1));
    /// assert_eq!(set.get(&"a"), Some(&2));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let &mut RankedSet {
            ref mut list,
            ref mut map,
        } = self;
        match map.get(&key) {
            Some(old_value) => {
                list.update(&key, old_value, value.clone());
            }
            None => {
                list.insert(key.clone(), value.clone());
            }
        }
        map.insert(key, value)
    }

    /// Removes a key from the set. If the key exists, it will return the
    /// associated value. Otherwise it will return `None`.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 1);
    /// assert_eq!(set.remove(&"a"), Some(1));
    /// assert_eq!(set.remove(&"a"), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let &mut RankedSet {
            ref mut list,
            ref mut map,
        } = self;
        let removed = match map.get(key) {
            Some(value) => list.remove(key, value),
            None => return None,
        };
        map.remove(key);
        removed.map(|(_, value)| value)
    }

    /// Returns the 1-based rank of a key, or `None` if the key does not exist
    /// in the set.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 10);
    /// set.insert("b", 10);
    /// assert_eq!(set.rank_of(&"a"), Some(1));
    /// assert_eq!(set.rank_of(&"b"), Some(2));
    /// assert_eq!(set.rank_of(&"c"), None);
    /// ```
    pub fn rank_of(&self, key: &K) -> Option<usize> {
        let value = self.map.get(key)?;
        self.list.rank_of(key, value)
    }

    /// Returns an immutable reference to the value associated with a
    /// particular key. It will return `None` if the key does not exist in the
    /// set. This is a pure map lookup that never traverses the skiplist.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 1);
    /// assert_eq!(set.get(&"a"), Some(&1));
    /// assert_eq!(set.get(&"b"), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Checks if a key exists in the set.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 1);
    /// assert!(set.contains_key(&"a"));
    /// assert!(!set.contains_key(&"b"));
    /// ```
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the entry at a particular 1-based rank. Returns `None` if the
    /// rank is zero or exceeds the length of the set.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 2);
    /// set.insert("b", 1);
    /// assert_eq!(set.get_by_rank(1), Some((&"b", &1)));
    /// assert_eq!(set.get_by_rank(3), None);
    /// ```
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        self.list.get_by_rank(rank)
    }

    /// Visits every entry with a rank in `[rank_low, rank_high]` in ascending
    /// order, invoking `f` with the rank, key, and value of each entry.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// for i in 0..5 {
    ///     set.insert(i, i);
    /// }
    ///
    /// let mut ranks = Vec::new();
    /// set.range_by_rank(2, 4, |rank, _, _| ranks.push(rank));
    /// assert_eq!(ranks, vec![2, 3, 4]);
    /// ```
    pub fn range_by_rank<F>(&self, rank_low: usize, rank_high: usize, f: F)
    where
        F: FnMut(usize, &K, &V),
    {
        self.list.range_by_rank(rank_low, rank_high, f);
    }

    /// Removes every entry with a rank in `[rank_low, rank_high]`, invoking
    /// `f` with the rank, key, and value of each removed entry, and returns
    /// the number of entries removed. Each removed key is also erased from
    /// the auxiliary map.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// for i in 0..10 {
    ///     set.insert(i, i);
    /// }
    ///
    /// assert_eq!(set.remove_range_by_rank(1, 3, |_, _, _| {}), 3);
    /// assert_eq!(set.len(), 7);
    /// assert!(!set.contains_key(&0));
    /// assert_eq!(set.rank_of(&3), Some(1));
    /// ```
    pub fn remove_range_by_rank<F>(&mut self, rank_low: usize, rank_high: usize, mut f: F) -> usize
    where
        F: FnMut(usize, &K, &V),
    {
        let &mut RankedSet {
            ref mut list,
            ref mut map,
        } = self;
        list.remove_range_by_rank(rank_low, rank_high, |rank, key, value| {
            map.remove(key);
            f(rank, key, value);
        })
    }

    /// Returns the rank, key, and value of the first entry whose value is
    /// strictly greater than `value`. Returns `None` if no such entry exists.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 1);
    /// set.insert("b", 3);
    /// assert_eq!(set.higher(&1), Some((2, &"b", &3)));
    /// assert_eq!(set.higher(&3), None);
    /// ```
    pub fn higher(&self, value: &V) -> Option<(usize, &K, &V)> {
        self.list.higher(value)
    }

    /// Returns the rank, key, and value of the first entry whose value is
    /// greater than or equal to `value`. Returns `None` if no such entry
    /// exists.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 1);
    /// set.insert("b", 3);
    /// assert_eq!(set.ceil(&2), Some((2, &"b", &3)));
    /// assert_eq!(set.ceil(&4), None);
    /// ```
    pub fn ceil(&self, value: &V) -> Option<(usize, &K, &V)> {
        self.list.ceil(value)
    }

    /// Returns the rank, key, and value of the last entry whose value is
    /// strictly less than `value`. Returns `None` if no such entry exists.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 1);
    /// set.insert("b", 3);
    /// assert_eq!(set.lower(&3), Some((1, &"a", &1)));
    /// assert_eq!(set.lower(&1), None);
    /// ```
    pub fn lower(&self, value: &V) -> Option<(usize, &K, &V)> {
        self.list.lower(value)
    }

    /// Returns the rank, key, and value of the last entry whose value is less
    /// than or equal to `value`. Returns `None` if no such entry exists.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 1);
    /// set.insert("b", 3);
    /// assert_eq!(set.floor(&2), Some((1, &"a", &1)));
    /// assert_eq!(set.floor(&0), None);
    /// ```
    pub fn floor(&self, value: &V) -> Option<(usize, &K, &V)> {
        self.list.floor(value)
    }

    /// Visits every entry whose value falls within the given interval in
    /// ascending order, invoking `f` with the rank, key, and value of each
    /// entry. The interval endpoints are independently inclusive or
    /// exclusive.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// for i in 1..=10 {
    ///     set.insert(i, i);
    /// }
    ///
    /// let mut values = Vec::new();
    /// set.range_by_value(&3, false, &7, true, |_, _, value| values.push(*value));
    /// assert_eq!(values, vec![4, 5, 6, 7]);
    /// ```
    pub fn range_by_value<F>(&self, low: &V, include_low: bool, high: &V, include_high: bool, f: F)
    where
        F: FnMut(usize, &K, &V),
    {
        self.list.range_by_value(low, include_low, high, include_high, f);
    }

    /// Returns the number of entries whose value falls within the given
    /// interval. The interval endpoints are independently inclusive or
    /// exclusive.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// for i in 1..=10 {
    ///     set.insert(i, i);
    /// }
    ///
    /// assert_eq!(set.count_by_value(&3, true, &7, true), 5);
    /// assert_eq!(set.count_by_value(&7, true, &3, true), 0);
    /// ```
    pub fn count_by_value(&self, low: &V, include_low: bool, high: &V, include_high: bool) -> usize {
        self.list.count_by_value(low, include_low, high, include_high)
    }

    /// Removes every entry whose value falls within the given interval,
    /// invoking `f` with the rank, key, and value of each removed entry, and
    /// returns the number of entries removed. Each removed key is also erased
    /// from the auxiliary map.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// for i in 1..=5 {
    ///     set.insert(i, i);
    /// }
    ///
    /// assert_eq!(set.remove_range_by_value(&2, true, &4, true, |_, _, _| {}), 3);
    /// assert_eq!(set.len(), 2);
    /// assert!(!set.contains_key(&3));
    /// ```
    pub fn remove_range_by_value<F>(
        &mut self,
        low: &V,
        include_low: bool,
        high: &V,
        include_high: bool,
        mut f: F,
    ) -> usize
    where
        F: FnMut(usize, &K, &V),
    {
        let &mut RankedSet {
            ref mut list,
            ref mut map,
        } = self;
        list.remove_range_by_value(low, include_low, high, include_high, |rank, key, value| {
            map.remove(key);
            f(rank, key, value);
        })
    }

    /// Visits the entry at `rank` and up to `lower_count` entries below it
    /// and `upper_count` entries above it. The center entry is always visited
    /// and never counts against either budget; for every other candidate,
    /// `pick` returning `true` consumes one unit of the respective budget
    /// while `false` leaves the budget untouched.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// for i in 1..=5 {
    ///     set.insert(i, i);
    /// }
    ///
    /// let mut ranks = Vec::new();
    /// set.nearby_rank(3, 1, 1, |rank, _, _| {
    ///     ranks.push(rank);
    ///     true
    /// });
    /// assert_eq!(ranks, vec![3, 2, 4]);
    /// ```
    pub fn nearby_rank<F>(&self, rank: usize, lower_count: usize, upper_count: usize, pick: F)
    where
        F: FnMut(usize, &K, &V) -> bool,
    {
        self.list.nearby_rank(rank, lower_count, upper_count, pick);
    }

    /// Visits the entry closest to `value` and up to `lower_count` entries
    /// below it and `upper_count` entries above it, with the same budget
    /// semantics as [`nearby_rank`].
    ///
    /// [`nearby_rank`]: #method.nearby_rank
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// for i in 1..=5 {
    ///     set.insert(i * 10, i * 10);
    /// }
    ///
    /// let mut values = Vec::new();
    /// set.nearby_value(&25, 1, 1, |_, _, value| {
    ///     values.push(*value);
    ///     true
    /// });
    /// assert_eq!(values, vec![30, 20, 40]);
    /// ```
    pub fn nearby_value<F>(&self, value: &V, lower_count: usize, upper_count: usize, pick: F)
    where
        F: FnMut(usize, &K, &V) -> bool,
    {
        self.list.nearby_value(value, lower_count, upper_count, pick);
    }

    /// Returns the number of entries in the set.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 1);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the set is empty.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let set: RankedSet<u32, u32> = RankedSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Clears the set, removing all entries from both the skiplist and the
    /// auxiliary map.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 1);
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert!(!set.contains_key(&"a"));
    /// ```
    pub fn clear(&mut self) {
        self.list.clear();
        self.map.clear();
    }

    /// Returns an iterator over the set. The iterator yields the rank, key,
    /// and value of every entry in ascending order.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 2);
    /// set.insert("b", 1);
    ///
    /// let mut iterator = set.iter();
    /// assert_eq!(iterator.next(), Some((1, &"b", &1)));
    /// assert_eq!(iterator.next(), Some((2, &"a", &2)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<K, V> {
        self.list.iter()
    }

    /// Returns an iterator over the set that yields the rank, key, and value
    /// of every entry in descending order.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 2);
    /// set.insert("b", 1);
    ///
    /// let mut iterator = set.iter_reverse();
    /// assert_eq!(iterator.next(), Some((2, &"a", &2)));
    /// assert_eq!(iterator.next(), Some((1, &"b", &1)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter_reverse(&self) -> IterReverse<K, V> {
        self.list.iter_reverse()
    }

    /// Validates the consistency of the set: the auxiliary map and the
    /// skiplist hold the same number of entries, the skiplist order is
    /// monotonic, and replaying a full forward traversal of the skiplist
    /// reconstructs a key-to-value mapping identical to the auxiliary map
    /// with no duplicate keys.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// set.insert("a", 1);
    /// set.insert("b", 2);
    /// assert!(set.is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        if self.map.len() != self.list.len() {
            return false;
        }
        if !self.list.is_valid() {
            return false;
        }

        let mut replayed = BTreeMap::new();
        for (_, key, value) in self.list.iter() {
            if replayed.insert(key, value).is_some() {
                return false;
            }
        }
        if replayed.len() != self.map.len() {
            return false;
        }
        self.map
            .iter()
            .zip(replayed.iter())
            .all(|((key, value), (&replayed_key, &replayed_value))| {
                key == replayed_key && value == replayed_value
            })
    }

    /// Rebuilds the skiplist's internal link structure, discarding any height
    /// skew accumulated over long mutation sequences. The auxiliary map is
    /// untouched since the contents do not change.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSet;
    ///
    /// let mut set = RankedSet::new();
    /// for i in 0..100 {
    ///     set.insert(i, i);
    /// }
    ///
    /// set.rebalance();
    /// assert!(set.is_valid());
    /// assert_eq!(set.rank_of(&50), Some(51));
    /// ```
    pub fn rebalance(&mut self) {
        self.list.rebalance();
    }
}

impl<K, V> Default for RankedSet<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> PartialEq for RankedSet<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn eq(&self, other: &RankedSet<K, V>) -> bool {
        self.map == other.map
    }
}

impl<K, V> Eq for RankedSet<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
}

impl<K, V> fmt::Debug for RankedSet<K, V>
where
    K: Ord + Clone + fmt::Debug,
    V: Ord + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(_, key, value)| (key, value)))
            .finish()
    }
}

impl<'a, K, V> IntoIterator for &'a RankedSet<K, V>
where
    K: 'a + Ord + Clone,
    V: 'a + Ord + Clone,
{
    type Item = (usize, &'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> Serialize for RankedSet<K, V>
where
    K: Ord + Clone + Serialize,
    V: Ord + Clone + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (_, key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for RankedSet<K, V>
where
    K: Ord + Clone + Deserialize<'de>,
    V: Ord + Clone + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RankedSetVisitor<K, V>
        where
            K: Ord + Clone,
            V: Ord + Clone,
        {
            marker: PhantomData<(K, V)>,
        }

        impl<'de, K, V> Visitor<'de> for RankedSetVisitor<K, V>
        where
            K: Ord + Clone + Deserialize<'de>,
            V: Ord + Clone + Deserialize<'de>,
        {
            type Value = RankedSet<K, V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of keys to values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut set = RankedSet::new();
                while let Some((key, value)) = access.next_entry()? {
                    set.insert(key, value);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(RankedSetVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RankedSet;
    use rand::{Rng, SeedableRng, XorShiftRng};
    use serde_test::{assert_tokens, Token};

    #[test]
    fn test_len_empty() {
        let set: RankedSet<u32, u32> = RankedSet::new();
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_is_empty() {
        let set: RankedSet<u32, u32> = RankedSet::new();
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_and_rescore() {
        let mut set = RankedSet::new();
        assert_eq!(set.insert("a", 1), None);
        assert_eq!(set.insert("a", 5), Some(1));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&"a"), Some(&5));
        assert!(set.is_valid());
    }

    #[test]
    fn test_rescore_moves_rank() {
        let mut set = RankedSet::new();
        set.insert("a", 1);
        set.insert("b", 2);
        set.insert("c", 3);

        set.insert("a", 10);
        assert_eq!(set.rank_of(&"a"), Some(3));
        assert_eq!(set.rank_of(&"b"), Some(1));
        assert!(set.is_valid());
    }

    #[test]
    fn test_idempotent_rescore() {
        let mut set = RankedSet::new();
        set.insert("a", 1);
        set.insert("b", 2);

        assert_eq!(set.insert("b", 2), Some(2));
        assert_eq!(set.rank_of(&"b"), Some(2));
        assert_eq!(set.len(), 2);
        assert!(set.is_valid());
    }

    #[test]
    fn test_remove() {
        let mut set = RankedSet::new();
        set.insert("a", 1);
        assert_eq!(set.remove(&"a"), Some(1));
        assert_eq!(set.remove(&"a"), None);
        assert!(set.is_empty());
        assert!(set.is_valid());
    }

    #[test]
    fn test_rank_of() {
        let mut set = RankedSet::new();
        for i in 0..10 {
            set.insert(format!("K{}", i), i);
        }

        assert_eq!(set.rank_of(&String::from("K5")), Some(6));
        assert_eq!(set.get_by_rank(6), Some((&String::from("K5"), &5)));
        assert_eq!(set.rank_of(&String::from("K10")), None);
    }

    #[test]
    fn test_get_and_contains() {
        let mut set = RankedSet::new();
        set.insert("a", 1);
        assert_eq!(set.get(&"a"), Some(&1));
        assert_eq!(set.get(&"b"), None);
        assert!(set.contains_key(&"a"));
        assert!(!set.contains_key(&"b"));
    }

    #[test]
    fn test_remove_range_by_rank_syncs_map() {
        let mut set = RankedSet::new();
        for i in 0..10 {
            set.insert(format!("K{}", i), i);
        }

        let mut removed = Vec::new();
        let count = set.remove_range_by_rank(1, 3, |rank, key, value| {
            removed.push((rank, key.clone(), *value));
        });

        assert_eq!(count, 3);
        assert_eq!(set.len(), 7);
        assert!(!set.contains_key(&String::from("K0")));
        assert!(!set.contains_key(&String::from("K1")));
        assert!(!set.contains_key(&String::from("K2")));
        assert_eq!(set.rank_of(&String::from("K3")), Some(1));
        assert!(set.is_valid());
        assert_eq!(
            removed,
            vec![
                (1, String::from("K0"), 0),
                (2, String::from("K1"), 1),
                (3, String::from("K2"), 2),
            ],
        );
    }

    #[test]
    fn test_remove_range_by_value_syncs_map() {
        let mut set = RankedSet::new();
        for i in 1..=10 {
            set.insert(i, i);
        }

        let count = set.remove_range_by_value(&3, false, &7, true, |_, _, _| {});

        assert_eq!(count, 4);
        assert_eq!(set.len(), 6);
        for value in 4..=7 {
            assert!(!set.contains_key(&value));
        }
        assert!(set.is_valid());
    }

    #[test]
    fn test_boundaries() {
        let mut set = RankedSet::new();
        set.insert("a", 1);
        set.insert("b", 3);
        set.insert("c", 5);

        assert_eq!(set.higher(&3), Some((3, &"c", &5)));
        assert_eq!(set.ceil(&3), Some((2, &"b", &3)));
        assert_eq!(set.lower(&3), Some((1, &"a", &1)));
        assert_eq!(set.floor(&3), Some((2, &"b", &3)));
    }

    #[test]
    fn test_count_matches_range() {
        let mut set = RankedSet::new();
        for i in 1..=10 {
            set.insert(i, i);
        }

        let mut count = 0;
        set.range_by_value(&3, true, &7, true, |_, _, _| count += 1);
        assert_eq!(set.count_by_value(&3, true, &7, true), count);
    }

    #[test]
    fn test_nearby_rank() {
        let mut set = RankedSet::new();
        for i in 1..=5 {
            set.insert(i, i);
        }

        let mut ranks = Vec::new();
        set.nearby_rank(3, 1, 1, |rank, _, _| {
            ranks.push(rank);
            true
        });
        assert_eq!(ranks, vec![3, 2, 4]);
    }

    #[test]
    fn test_nearby_value() {
        let mut set = RankedSet::new();
        for i in 1..=5 {
            set.insert(i * 10, i * 10);
        }

        let mut values = Vec::new();
        set.nearby_value(&35, 2, 2, |_, _, value| {
            values.push(*value);
            true
        });
        assert_eq!(values, vec![40, 30, 20, 50]);
    }

    #[test]
    fn test_iter() {
        let mut set = RankedSet::new();
        set.insert("a", 2);
        set.insert("b", 3);
        set.insert("c", 1);

        assert_eq!(
            set.iter().collect::<Vec<(usize, &&str, &u32)>>(),
            vec![(1, &"c", &1), (2, &"a", &2), (3, &"b", &3)],
        );
        assert_eq!(
            set.iter_reverse().collect::<Vec<(usize, &&str, &u32)>>(),
            vec![(3, &"b", &3), (2, &"a", &2), (1, &"c", &1)],
        );
    }

    #[test]
    fn test_clear() {
        let mut set = RankedSet::new();
        set.insert("a", 1);
        set.insert("b", 2);
        set.clear();

        assert!(set.is_empty());
        assert!(!set.contains_key(&"a"));
        assert!(set.is_valid());
    }

    #[test]
    fn test_rebalance() {
        let mut set = RankedSet::new();
        for i in 0..100 {
            set.insert(i, i);
        }

        set.rebalance();

        assert!(set.is_valid());
        for i in 0..100 {
            assert_eq!(set.rank_of(&i), Some(i + 1));
        }
    }

    #[test]
    fn test_random_operations() {
        let mut rng: XorShiftRng = SeedableRng::from_seed([1, 1, 1, 1]);
        let mut set = RankedSet::new();

        for operation in 0..5_000 {
            let key = rng.gen::<u32>() % 512;
            let value = rng.gen::<u32>() % 128;

            if rng.gen::<u32>() % 10 < 7 {
                set.insert(key, value);
            } else {
                set.remove(&key);
            }

            if operation % 500 == 0 {
                assert!(set.is_valid());
            }
        }

        assert!(set.is_valid());
        set.clear();
        assert!(set.is_valid());
    }

    #[test]
    fn test_ser_de() {
        let mut set = RankedSet::new();
        set.insert(String::from("a"), 2);
        set.insert(String::from("b"), 1);

        assert_tokens(
            &set,
            &[
                Token::Map { len: Some(2) },
                Token::Str("b"),
                Token::I32(1),
                Token::Str("a"),
                Token::I32(2),
                Token::MapEnd,
            ],
        );
    }

    #[test]
    fn test_eq() {
        let mut left = RankedSet::new();
        left.insert("a", 1);
        left.insert("b", 2);

        let mut right = RankedSet::new();
        right.insert("b", 2);
        right.insert("a", 1);

        assert_eq!(left, right);

        right.insert("a", 3);
        assert_ne!(left, right);
    }
}
