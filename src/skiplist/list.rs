use crate::arena::Arena;
use crate::skiplist::node::{Link, Node};
use rand::Rng;
use rand::XorShiftRng;
use std::cmp;

const DEFAULT_MAX_LEVEL: usize = 32;
const DEFAULT_BRANCH_PROB_PERCENT: u32 = 25;

/// An ordered list of key-value pairs implemented by a rank-indexed skiplist.
///
/// A skiplist is a probabilistic data structure that allows for binary search
/// tree operations by maintaining a linked hierarchy of subsequences. The
/// first subsequence is essentially a sorted linked list of all the elements
/// that it contains. Each successive subsequence contains approximately a
/// quarter of the elements of the previous subsequence. Using the sparser
/// subsequences, elements can be skipped and searching, insertion, and
/// deletion of entries can be done in approximately logarithm time.
///
/// Entries are kept sorted by value in ascending order, with ties broken by
/// key. Each link additionally stores the number of bottom layer links it
/// traverses. This augmentation allows the list to resolve the 1-based rank
/// of an entry, fetch the entry at an arbitrary rank, and resolve value
/// intervals into rank intervals, all in `O(log N)` time.
///
/// The list itself never deduplicates: inserting a pair whose key is already
/// present is a contract violation on the caller. [`RankedSet`] enforces key
/// uniqueness by consulting its auxiliary map before every mutation.
///
/// [`RankedSet`]: struct.RankedSet.html
///
/// # Examples
/// ```
/// use ranked_collections::skiplist::RankedSkipList;
///
/// let mut list = RankedSkipList::new();
/// list.insert("alice", 50);
/// list.insert("bob", 30);
/// list.insert("carol", 40);
///
/// assert_eq!(list.rank_of(&"bob", &30), Some(1));
/// assert_eq!(list.get_by_rank(3), Some((&"alice", &50)));
/// assert_eq!(list.len(), 3);
///
/// assert!(list.update(&"bob", &30, 60));
/// assert_eq!(list.rank_of(&"bob", &60), Some(3));
///
/// assert_eq!(list.remove(&"carol", &40), Some(("carol", 40)));
/// assert_eq!(list.len(), 2);
/// ```
pub struct RankedSkipList<K, V>
where
    K: Ord,
    V: Ord,
{
    nodes: Arena<Node<K, V>>,
    head: Vec<Link>,
    tail: Option<usize>,
    rng: XorShiftRng,
    len: usize,
    level: usize,
    max_level: usize,
    branch_threshold: u32,
}

impl<K, V> RankedSkipList<K, V>
where
    K: Ord,
    V: Ord,
{
    /// Constructs a new, empty `RankedSkipList<K, V>` with the default
    /// maximum level of 32 and branch probability of 25%.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let list: RankedSkipList<u32, u32> = RankedSkipList::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(DEFAULT_MAX_LEVEL, DEFAULT_BRANCH_PROB_PERCENT)
    }

    /// Constructs a new, empty `RankedSkipList<K, V>` with a specific maximum
    /// level and branch probability. Both values are fixed for the lifetime
    /// of the list.
    ///
    /// # Panics
    /// Panics if `max_level` is zero, or if `branch_prob_percent` is outside
    /// of `[1, 99]`.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let list: RankedSkipList<u32, u32> = RankedSkipList::with_config(16, 50);
    /// ```
    pub fn with_config(max_level: usize, branch_prob_percent: u32) -> Self {
        assert!(max_level >= 1, "max_level must be at least 1.");
        assert!(
            branch_prob_percent >= 1 && branch_prob_percent <= 99,
            "branch_prob_percent must be in [1, 99].",
        );
        RankedSkipList {
            nodes: Arena::new(),
            head: vec![Link::default(); max_level],
            tail: None,
            rng: XorShiftRng::new_unseeded(),
            len: 0,
            level: 1,
            max_level,
            branch_threshold: branch_prob_percent * 0xFFFF / 100,
        }
    }

    fn random_level(&mut self) -> usize {
        let mut level = 1;
        while level < self.max_level && (self.rng.next_u32() & 0xFFFF) < self.branch_threshold {
            level += 1;
        }
        level
    }

    fn link(&self, node: Option<usize>, level: usize) -> &Link {
        match node {
            Some(index) => &self.nodes[index].links[level],
            None => &self.head[level],
        }
    }

    fn link_mut(&mut self, node: Option<usize>, level: usize) -> &mut Link {
        match node {
            Some(index) => &mut self.nodes[index].links[level],
            None => &mut self.head[level],
        }
    }

    /// Fills `update` with the last position visited at each level before the
    /// splice point of the node at `index`, and `rank` with the rank advanced
    /// up to that position. `None` positions denote the header.
    fn find_insert_position(
        &self,
        index: usize,
        update: &mut [Option<usize>],
        rank: &mut [usize],
    ) {
        let mut x: Option<usize> = None;
        for i in (0..self.level).rev() {
            rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
            loop {
                let Link { forward, span } = *self.link(x, i);
                match forward {
                    Some(next) if self.nodes[next].entry < self.nodes[index].entry => {
                        rank[i] += span;
                        x = Some(next);
                    }
                    _ => break,
                }
            }
            update[i] = x;
        }
    }

    /// Same descent as `find_insert_position`, locating an exact (key, value)
    /// pair for removal. Value ties advance only while the forward key is
    /// strictly less than `key`.
    fn find_update_path(&self, key: &K, value: &V, update: &mut [Option<usize>]) {
        let mut x: Option<usize> = None;
        for i in (0..self.level).rev() {
            while let Some(next) = self.link(x, i).forward {
                let entry = &self.nodes[next].entry;
                if entry.value < *value || (entry.value == *value && entry.key < *key) {
                    x = Some(next);
                } else {
                    break;
                }
            }
            update[i] = x;
        }
    }

    fn insert_node(&mut self, index: usize) {
        let mut update = vec![None; self.max_level];
        let mut rank = vec![0; self.max_level];
        self.find_insert_position(index, &mut update, &mut rank);

        if let Some(next) = self.link(update[0], 0).forward {
            debug_assert!(
                self.nodes[next].entry != self.nodes[index].entry,
                "insert of a duplicate (key, value) pair",
            );
        }

        let level = self.random_level();
        if level > self.level {
            for i in self.level..level {
                rank[i] = 0;
                update[i] = None;
                self.head[i].span = self.len;
            }
            self.level = level;
        }

        self.nodes[index].links.resize(level, Link::default());

        for i in 0..level {
            let advanced = rank[0] - rank[i];
            let Link { forward, span } = *self.link(update[i], i);
            {
                let link = &mut self.nodes[index].links[i];
                link.forward = forward;
                link.span = span - advanced;
            }
            let link = self.link_mut(update[i], i);
            link.forward = Some(index);
            link.span = advanced + 1;
        }
        for i in level..self.level {
            self.link_mut(update[i], i).span += 1;
        }

        self.nodes[index].backward = update[0];
        let forward = self.nodes[index].links[0].forward;
        match forward {
            Some(next) => self.nodes[next].backward = Some(index),
            None => self.tail = Some(index),
        }
        self.len += 1;
    }

    /// Unlinks the node at `index` at every level, given the predecessor
    /// positions recorded by a preceding descent. The node stays in the arena.
    fn unsplice(&mut self, index: usize, update: &[Option<usize>]) {
        for i in 0..self.level {
            if self.link(update[i], i).forward == Some(index) {
                let Link { forward, span } = self.nodes[index].links[i];
                let link = self.link_mut(update[i], i);
                link.span += span;
                link.span -= 1;
                link.forward = forward;
            } else {
                self.link_mut(update[i], i).span -= 1;
            }
        }

        let backward = self.nodes[index].backward;
        let forward = self.nodes[index].links[0].forward;
        match forward {
            Some(next) => self.nodes[next].backward = backward,
            None => self.tail = backward,
        }
        while self.level > 1 && self.head[self.level - 1].forward.is_none() {
            self.level -= 1;
        }
        self.len -= 1;
    }

    /// Inserts a key-value pair into the list at its sorted position. The
    /// key must not already be present in the list; key uniqueness is the
    /// caller's responsibility.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 2);
    /// list.insert("b", 1);
    /// assert_eq!(list.get_by_rank(1), Some((&"b", &1)));
    /// ```
    pub fn insert(&mut self, key: K, value: V) {
        let index = self.nodes.insert(Node::new(key, value));
        self.insert_node(index);
    }

    /// Removes the entry matching both `key` and `value` from the list. If
    /// such an entry exists, it will return the associated key-value pair.
    /// Otherwise it will return `None`.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 1);
    /// assert_eq!(list.remove(&"a", &1), Some(("a", 1)));
    /// assert_eq!(list.remove(&"a", &1), None);
    /// ```
    pub fn remove(&mut self, key: &K, value: &V) -> Option<(K, V)> {
        let mut update = vec![None; self.max_level];
        self.find_update_path(key, value, &mut update);

        let index = self.link(update[0], 0).forward?;
        {
            let entry = &self.nodes[index].entry;
            if entry.key != *key || entry.value != *value {
                return None;
            }
        }

        self.unsplice(index, &update);
        let node = self.nodes.remove(index);
        Some((node.entry.key, node.entry.value))
    }

    /// Changes the value of the entry matching both `key` and `value` to
    /// `new_value`, relocating the entry to its new sorted position. Returns
    /// `false` if no such entry exists.
    ///
    /// When the new value still lies strictly between the values of the
    /// entry's level-0 neighbors, the value is changed in place without any
    /// restructuring.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 1);
    /// list.insert("b", 2);
    /// assert!(list.update(&"a", &1, 3));
    /// assert_eq!(list.rank_of(&"a", &3), Some(2));
    /// assert!(!list.update(&"a", &1, 5));
    /// ```
    pub fn update(&mut self, key: &K, value: &V, new_value: V) -> bool {
        let mut update = vec![None; self.max_level];
        self.find_update_path(key, value, &mut update);

        let index = match self.link(update[0], 0).forward {
            Some(index) => index,
            None => return false,
        };
        {
            let entry = &self.nodes[index].entry;
            if entry.key != *key || entry.value != *value {
                return false;
            }
        }

        let in_place = {
            let node = &self.nodes[index];
            let backward_ok = match node.backward {
                Some(prev) => self.nodes[prev].entry.value < new_value,
                None => true,
            };
            let forward_ok = match node.links[0].forward {
                Some(next) => new_value < self.nodes[next].entry.value,
                None => true,
            };
            backward_ok && forward_ok
        };

        if in_place {
            self.nodes[index].entry.value = new_value;
            return true;
        }

        self.unsplice(index, &update);
        {
            let node = &mut self.nodes[index];
            node.reset();
            node.entry.value = new_value;
        }
        self.insert_node(index);
        true
    }

    /// Returns the 1-based rank of the entry matching both `key` and `value`,
    /// or `None` if no such entry exists.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 10);
    /// list.insert("b", 10);
    /// assert_eq!(list.rank_of(&"a", &10), Some(1));
    /// assert_eq!(list.rank_of(&"b", &10), Some(2));
    /// assert_eq!(list.rank_of(&"c", &10), None);
    /// ```
    pub fn rank_of(&self, key: &K, value: &V) -> Option<usize> {
        let mut rank = 0;
        let mut x: Option<usize> = None;

        for i in (0..self.level).rev() {
            loop {
                let Link { forward, span } = *self.link(x, i);
                let next = match forward {
                    Some(next) => next,
                    None => break,
                };
                // Value ties advance through keys up to and including `key`,
                // so the descent stops at the match instead of passing it.
                // The removal descent must not do this.
                let entry = &self.nodes[next].entry;
                if entry.value < *value || (entry.value == *value && entry.key <= *key) {
                    rank += span;
                    x = Some(next);
                } else {
                    break;
                }
            }

            if let Some(index) = x {
                let entry = &self.nodes[index].entry;
                if entry.key == *key && entry.value == *value {
                    return Some(rank);
                }
            }
        }
        None
    }

    fn node_by_rank(&self, rank: usize) -> Option<usize> {
        if rank == 0 || rank > self.len {
            return None;
        }

        let mut traversed = 0;
        let mut x: Option<usize> = None;
        for i in (0..self.level).rev() {
            loop {
                let Link { forward, span } = *self.link(x, i);
                match forward {
                    Some(next) if traversed + span <= rank => {
                        traversed += span;
                        x = Some(next);
                    }
                    _ => break,
                }
            }

            if traversed == rank {
                return x;
            }
        }
        None
    }

    /// Returns the entry at a particular 1-based rank. Returns `None` if the
    /// rank is zero or exceeds the length of the list.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 1);
    /// assert_eq!(list.get_by_rank(0), None);
    /// assert_eq!(list.get_by_rank(1), Some((&"a", &1)));
    /// assert_eq!(list.get_by_rank(2), None);
    /// ```
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        self.node_by_rank(rank).map(|index| {
            let entry = &self.nodes[index].entry;
            (&entry.key, &entry.value)
        })
    }

    /// Visits every entry with a rank in `[rank_low, rank_high]` in ascending
    /// order, invoking `f` with the rank, key, and value of each entry. An
    /// inverted or out-of-range interval visits nothing.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// for i in 0..5 {
    ///     list.insert(i, i * 10);
    /// }
    ///
    /// let mut collected = Vec::new();
    /// list.range_by_rank(2, 4, |rank, key, value| collected.push((rank, *key, *value)));
    /// assert_eq!(collected, vec![(2, 1, 10), (3, 2, 20), (4, 3, 30)]);
    /// ```
    pub fn range_by_rank<F>(&self, rank_low: usize, rank_high: usize, mut f: F)
    where
        F: FnMut(usize, &K, &V),
    {
        if rank_low > rank_high {
            return;
        }

        let mut x = self.node_by_rank(rank_low);
        let count = rank_high - rank_low + 1;
        let mut n = 0;

        while let Some(index) = x {
            if n >= count {
                break;
            }
            let node = &self.nodes[index];
            f(rank_low + n, &node.entry.key, &node.entry.value);
            x = node.links[0].forward;
            n += 1;
        }
    }

    /// Removes every entry with a rank in `[rank_low, rank_high]`, invoking
    /// `f` with the rank, key, and value of each removed entry, and returns
    /// the number of entries removed. The removal is performed in a single
    /// left-to-right pass.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// for i in 0..5 {
    ///     list.insert(i, i);
    /// }
    ///
    /// assert_eq!(list.remove_range_by_rank(1, 3, |_, _, _| {}), 3);
    /// assert_eq!(list.len(), 2);
    /// assert_eq!(list.rank_of(&3, &3), Some(1));
    /// ```
    pub fn remove_range_by_rank<F>(&mut self, rank_low: usize, rank_high: usize, mut f: F) -> usize
    where
        F: FnMut(usize, &K, &V),
    {
        if rank_high == 0 || rank_low > rank_high {
            return 0;
        }
        let rank_low = cmp::max(rank_low, 1);

        let mut update = vec![None; self.max_level];
        let mut traversed = 0;
        let mut x: Option<usize> = None;
        for i in (0..self.level).rev() {
            loop {
                let Link { forward, span } = *self.link(x, i);
                match forward {
                    Some(next) if traversed + span < rank_low => {
                        traversed += span;
                        x = Some(next);
                    }
                    _ => break,
                }
            }
            update[i] = x;
        }

        let count = rank_high - rank_low + 1;
        let mut removed = 0;
        let mut x = self.link(update[0], 0).forward;
        while let Some(index) = x {
            if removed >= count {
                break;
            }
            let next = self.nodes[index].links[0].forward;
            self.unsplice(index, &update);
            let node = self.nodes.remove(index);
            f(rank_low + removed, &node.entry.key, &node.entry.value);
            x = next;
            removed += 1;
        }
        removed
    }

    fn first_node_greater(&self, value: &V) -> Option<(usize, usize)> {
        let tail = self.tail?;
        if self.nodes[tail].entry.value <= *value {
            return None;
        }

        let mut traversed = 0;
        let mut x: Option<usize> = None;
        for i in (0..self.level).rev() {
            loop {
                let Link { forward, span } = *self.link(x, i);
                match forward {
                    Some(next) if self.nodes[next].entry.value <= *value => {
                        traversed += span;
                        x = Some(next);
                    }
                    _ => break,
                }
            }
        }

        let first = self.link(x, 0).forward?;
        if *value < self.nodes[first].entry.value {
            Some((first, traversed + 1))
        } else {
            None
        }
    }

    fn first_node_greater_equal(&self, value: &V) -> Option<(usize, usize)> {
        let tail = self.tail?;
        if self.nodes[tail].entry.value < *value {
            return None;
        }

        let mut traversed = 0;
        let mut x: Option<usize> = None;
        for i in (0..self.level).rev() {
            loop {
                let Link { forward, span } = *self.link(x, i);
                match forward {
                    Some(next) if self.nodes[next].entry.value < *value => {
                        traversed += span;
                        x = Some(next);
                    }
                    _ => break,
                }
            }
        }

        let first = self.link(x, 0).forward?;
        if self.nodes[first].entry.value >= *value {
            Some((first, traversed + 1))
        } else {
            None
        }
    }

    fn last_node_less(&self, value: &V) -> Option<(usize, usize)> {
        let first = self.head[0].forward?;
        if self.nodes[first].entry.value >= *value {
            return None;
        }

        let mut traversed = 0;
        let mut x: Option<usize> = None;
        for i in (0..self.level).rev() {
            loop {
                let Link { forward, span } = *self.link(x, i);
                match forward {
                    Some(next) if self.nodes[next].entry.value < *value => {
                        traversed += span;
                        x = Some(next);
                    }
                    _ => break,
                }
            }
        }

        let index = x?;
        if self.nodes[index].entry.value < *value {
            Some((index, traversed))
        } else {
            None
        }
    }

    fn last_node_less_equal(&self, value: &V) -> Option<(usize, usize)> {
        let first = self.head[0].forward?;
        if *value < self.nodes[first].entry.value {
            return None;
        }

        let mut traversed = 0;
        let mut x: Option<usize> = None;
        for i in (0..self.level).rev() {
            loop {
                let Link { forward, span } = *self.link(x, i);
                match forward {
                    Some(next) if self.nodes[next].entry.value <= *value => {
                        traversed += span;
                        x = Some(next);
                    }
                    _ => break,
                }
            }
        }

        let index = x?;
        if self.nodes[index].entry.value <= *value {
            Some((index, traversed))
        } else {
            None
        }
    }

    /// Returns the rank, key, and value of the first entry whose value is
    /// strictly greater than `value`. Returns `None` if no such entry exists.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 1);
    /// list.insert("b", 3);
    /// list.insert("c", 5);
    /// assert_eq!(list.higher(&3), Some((3, &"c", &5)));
    /// assert_eq!(list.higher(&5), None);
    /// ```
    pub fn higher(&self, value: &V) -> Option<(usize, &K, &V)> {
        self.first_node_greater(value).map(|(index, rank)| {
            let entry = &self.nodes[index].entry;
            (rank, &entry.key, &entry.value)
        })
    }

    /// Returns the rank, key, and value of the first entry whose value is
    /// greater than or equal to `value`. Returns `None` if no such entry
    /// exists.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 1);
    /// list.insert("b", 3);
    /// list.insert("c", 5);
    /// assert_eq!(list.ceil(&3), Some((2, &"b", &3)));
    /// assert_eq!(list.ceil(&4), Some((3, &"c", &5)));
    /// assert_eq!(list.ceil(&6), None);
    /// ```
    pub fn ceil(&self, value: &V) -> Option<(usize, &K, &V)> {
        self.first_node_greater_equal(value).map(|(index, rank)| {
            let entry = &self.nodes[index].entry;
            (rank, &entry.key, &entry.value)
        })
    }

    /// Returns the rank, key, and value of the last entry whose value is
    /// strictly less than `value`. Returns `None` if no such entry exists.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 1);
    /// list.insert("b", 3);
    /// list.insert("c", 5);
    /// assert_eq!(list.lower(&3), Some((1, &"a", &1)));
    /// assert_eq!(list.lower(&1), None);
    /// ```
    pub fn lower(&self, value: &V) -> Option<(usize, &K, &V)> {
        self.last_node_less(value).map(|(index, rank)| {
            let entry = &self.nodes[index].entry;
            (rank, &entry.key, &entry.value)
        })
    }

    /// Returns the rank, key, and value of the last entry whose value is less
    /// than or equal to `value`. Returns `None` if no such entry exists.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 1);
    /// list.insert("b", 3);
    /// list.insert("c", 5);
    /// assert_eq!(list.floor(&4), Some((2, &"b", &3)));
    /// assert_eq!(list.floor(&5), Some((3, &"c", &5)));
    /// assert_eq!(list.floor(&0), None);
    /// ```
    pub fn floor(&self, value: &V) -> Option<(usize, &K, &V)> {
        self.last_node_less_equal(value).map(|(index, rank)| {
            let entry = &self.nodes[index].entry;
            (rank, &entry.key, &entry.value)
        })
    }

    /// Visits every entry whose value falls within the given interval in
    /// ascending order, invoking `f` with the rank, key, and value of each
    /// entry. The interval endpoints are independently inclusive or
    /// exclusive. An empty or inverted interval visits nothing.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// for i in 1..=5 {
    ///     list.insert(i, i);
    /// }
    ///
    /// let mut values = Vec::new();
    /// list.range_by_value(&2, false, &4, true, |_, _, value| values.push(*value));
    /// assert_eq!(values, vec![3, 4]);
    /// ```
    pub fn range_by_value<F>(
        &self,
        low: &V,
        include_low: bool,
        high: &V,
        include_high: bool,
        mut f: F,
    ) where
        F: FnMut(usize, &K, &V),
    {
        let first = if include_low {
            self.first_node_greater_equal(low)
        } else {
            self.first_node_greater(low)
        };
        let (mut index, mut rank) = match first {
            Some(position) => position,
            None => return,
        };

        let last = if include_high {
            self.last_node_less_equal(high)
        } else {
            self.last_node_less(high)
        };
        let last_rank = match last {
            Some((_, rank)) => rank,
            None => return,
        };

        while rank <= last_rank {
            let node = &self.nodes[index];
            f(rank, &node.entry.key, &node.entry.value);
            match node.links[0].forward {
                Some(next) => index = next,
                None => break,
            }
            rank += 1;
        }
    }

    /// Returns the number of entries whose value falls within the given
    /// interval. The interval endpoints are independently inclusive or
    /// exclusive.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// for i in 1..=5 {
    ///     list.insert(i, i);
    /// }
    ///
    /// assert_eq!(list.count_by_value(&2, true, &4, true), 3);
    /// assert_eq!(list.count_by_value(&2, false, &4, false), 1);
    /// assert_eq!(list.count_by_value(&4, true, &2, true), 0);
    /// ```
    pub fn count_by_value(&self, low: &V, include_low: bool, high: &V, include_high: bool) -> usize {
        let first = if include_low {
            self.first_node_greater_equal(low)
        } else {
            self.first_node_greater(low)
        };
        let rank = match first {
            Some((_, rank)) => rank,
            None => return 0,
        };

        let last = if include_high {
            self.last_node_less_equal(high)
        } else {
            self.last_node_less(high)
        };
        let last_rank = match last {
            Some((_, rank)) => rank,
            None => return 0,
        };

        if rank <= last_rank {
            last_rank - rank + 1
        } else {
            0
        }
    }

    /// Removes every entry whose value falls within the given interval,
    /// invoking `f` with the rank, key, and value of each removed entry, and
    /// returns the number of entries removed.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// for i in 1..=5 {
    ///     list.insert(i, i);
    /// }
    ///
    /// assert_eq!(list.remove_range_by_value(&2, true, &4, true, |_, _, _| {}), 3);
    /// assert_eq!(list.len(), 2);
    /// ```
    pub fn remove_range_by_value<F>(
        &mut self,
        low: &V,
        include_low: bool,
        high: &V,
        include_high: bool,
        f: F,
    ) -> usize
    where
        F: FnMut(usize, &K, &V),
    {
        let first = if include_low {
            self.first_node_greater_equal(low)
        } else {
            self.first_node_greater(low)
        };
        let rank = match first {
            Some((_, rank)) => rank,
            None => return 0,
        };

        let last = if include_high {
            self.last_node_less_equal(high)
        } else {
            self.last_node_less(high)
        };
        let last_rank = match last {
            Some((_, rank)) => rank,
            None => return 0,
        };

        if rank > last_rank {
            return 0;
        }
        self.remove_range_by_rank(rank, last_rank, f)
    }

    fn visit_nearby<F>(
        &self,
        center: usize,
        rank: usize,
        lower_count: usize,
        upper_count: usize,
        pick: &mut F,
    ) where
        F: FnMut(usize, &K, &V) -> bool,
    {
        {
            let entry = &self.nodes[center].entry;
            pick(rank, &entry.key, &entry.value);
        }

        let mut remaining = lower_count;
        let mut x = self.nodes[center].backward;
        let mut r = rank - 1;
        while remaining > 0 {
            let index = match x {
                Some(index) => index,
                None => break,
            };
            let node = &self.nodes[index];
            if pick(r, &node.entry.key, &node.entry.value) {
                remaining -= 1;
            }
            x = node.backward;
            r -= 1;
        }

        let mut remaining = upper_count;
        let mut x = self.nodes[center].links[0].forward;
        let mut r = rank + 1;
        while remaining > 0 {
            let index = match x {
                Some(index) => index,
                None => break,
            };
            let node = &self.nodes[index];
            if pick(r, &node.entry.key, &node.entry.value) {
                remaining -= 1;
            }
            x = node.links[0].forward;
            r += 1;
        }
    }

    /// Visits the entry at `rank` and up to `lower_count` entries below it
    /// and `upper_count` entries above it. The center entry is always
    /// visited and never counts against either budget. For every other
    /// candidate, `pick` returning `true` consumes one unit of the respective
    /// budget while `false` leaves the budget untouched, so callers can
    /// filter candidates without exhausting their quota. Does nothing if
    /// `rank` is out of range.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// for i in 1..=5 {
    ///     list.insert(i, i);
    /// }
    ///
    /// let mut picked = Vec::new();
    /// list.nearby_rank(3, 1, 1, |rank, _, _| {
    ///     picked.push(rank);
    ///     true
    /// });
    /// assert_eq!(picked, vec![3, 2, 4]);
    /// ```
    pub fn nearby_rank<F>(&self, rank: usize, lower_count: usize, upper_count: usize, mut pick: F)
    where
        F: FnMut(usize, &K, &V) -> bool,
    {
        let center = match self.node_by_rank(rank) {
            Some(index) => index,
            None => return,
        };
        self.visit_nearby(center, rank, lower_count, upper_count, &mut pick);
    }

    /// Visits the entry closest to `value` and up to `lower_count` entries
    /// below it and `upper_count` entries above it, with the same budget
    /// semantics as [`nearby_rank`]. The center is the first entry with a
    /// value greater than or equal to `value`, falling back to the last entry
    /// with a value less than or equal to `value` when every value is
    /// smaller. Does nothing if the list is empty.
    ///
    /// [`nearby_rank`]: #method.nearby_rank
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// for i in 1..=5 {
    ///     list.insert(i * 10, i * 10);
    /// }
    ///
    /// let mut picked = Vec::new();
    /// list.nearby_value(&25, 1, 1, |_, _, value| {
    ///     picked.push(*value);
    ///     true
    /// });
    /// assert_eq!(picked, vec![30, 20, 40]);
    /// ```
    pub fn nearby_value<F>(&self, value: &V, lower_count: usize, upper_count: usize, mut pick: F)
    where
        F: FnMut(usize, &K, &V) -> bool,
    {
        let center = match self
            .first_node_greater_equal(value)
            .or_else(|| self.last_node_less_equal(value))
        {
            Some(position) => position,
            None => return,
        };
        self.visit_nearby(center.0, center.1, lower_count, upper_count, &mut pick);
    }

    /// Returns the number of entries in the list.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 1);
    /// assert_eq!(list.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list is empty.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let list: RankedSkipList<u32, u32> = RankedSkipList::new();
    /// assert!(list.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears the list, removing all entries.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 1);
    /// list.insert("b", 2);
    /// list.clear();
    /// assert!(list.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.nodes.clear();
        for link in &mut self.head {
            *link = Link::default();
        }
        self.tail = None;
        self.len = 0;
        self.level = 1;
    }

    /// Returns an iterator over the list. The iterator yields the rank, key,
    /// and value of every entry in ascending order.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 2);
    /// list.insert("b", 1);
    ///
    /// let mut iterator = list.iter();
    /// assert_eq!(iterator.next(), Some((1, &"b", &1)));
    /// assert_eq!(iterator.next(), Some((2, &"a", &2)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<K, V> {
        Iter {
            list: self,
            current: self.head[0].forward,
            rank: 1,
        }
    }

    /// Returns an iterator over the list that yields the rank, key, and value
    /// of every entry in descending order.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 2);
    /// list.insert("b", 1);
    ///
    /// let mut iterator = list.iter_reverse();
    /// assert_eq!(iterator.next(), Some((2, &"a", &2)));
    /// assert_eq!(iterator.next(), Some((1, &"b", &1)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter_reverse(&self) -> IterReverse<K, V> {
        IterReverse {
            list: self,
            current: self.tail,
            rank: self.len,
        }
    }

    /// Walks the bottom level of the list and returns `false` if any
    /// neighboring values are inverted.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// list.insert("a", 1);
    /// list.insert("b", 2);
    /// assert!(list.is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        let mut x = self.head[0].forward;
        while let Some(index) = x {
            let next = self.nodes[index].links[0].forward;
            if let Some(next_index) = next {
                if self.nodes[next_index].entry.value < self.nodes[index].entry.value {
                    return false;
                }
            }
            x = next;
        }
        true
    }

    /// Rebuilds the internal link structure by reinserting every entry with a
    /// freshly drawn level, discarding any height skew accumulated over long
    /// mutation sequences. The entries themselves and their order are
    /// unchanged.
    ///
    /// # Examples
    /// ```
    /// use ranked_collections::skiplist::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new();
    /// for i in 0..100 {
    ///     list.insert(i, i);
    /// }
    ///
    /// list.rebalance();
    /// assert_eq!(list.len(), 100);
    /// assert_eq!(list.rank_of(&50, &50), Some(51));
    /// ```
    pub fn rebalance(&mut self) {
        let mut order = Vec::with_capacity(self.len);
        let mut x = self.head[0].forward;
        while let Some(index) = x {
            x = self.nodes[index].links[0].forward;
            order.push(index);
        }

        for link in &mut self.head {
            *link = Link::default();
        }
        self.tail = None;
        self.len = 0;
        self.level = 1;

        for index in order {
            self.nodes[index].reset();
            self.insert_node(index);
        }
    }
}

impl<K, V> Default for RankedSkipList<K, V>
where
    K: Ord,
    V: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V> IntoIterator for &'a RankedSkipList<K, V>
where
    K: 'a + Ord,
    V: 'a + Ord,
{
    type Item = (usize, &'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator for `RankedSkipList<K, V>`.
///
/// This iterator traverses the entries of the list in ascending order and
/// yields ranks and immutable references.
pub struct Iter<'a, K, V>
where
    K: 'a + Ord,
    V: 'a + Ord,
{
    list: &'a RankedSkipList<K, V>,
    current: Option<usize>,
    rank: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: 'a + Ord,
    V: 'a + Ord,
{
    type Item = (usize, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        let list = self.list;
        let node = &list.nodes[index];
        self.current = node.links[0].forward;
        let rank = self.rank;
        self.rank += 1;
        Some((rank, &node.entry.key, &node.entry.value))
    }
}

/// A reverse iterator for `RankedSkipList<K, V>`.
///
/// This iterator traverses the entries of the list in descending order and
/// yields ranks and immutable references.
pub struct IterReverse<'a, K, V>
where
    K: 'a + Ord,
    V: 'a + Ord,
{
    list: &'a RankedSkipList<K, V>,
    current: Option<usize>,
    rank: usize,
}

impl<'a, K, V> Iterator for IterReverse<'a, K, V>
where
    K: 'a + Ord,
    V: 'a + Ord,
{
    type Item = (usize, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        let list = self.list;
        let node = &list.nodes[index];
        self.current = node.backward;
        let rank = self.rank;
        self.rank -= 1;
        Some((rank, &node.entry.key, &node.entry.value))
    }
}
