use std::cmp::Ordering;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Entry<K, V>
where
    K: Ord,
    V: Ord,
{
    pub key: K,
    pub value: V,
}

impl<K, V> Ord for Entry<K, V>
where
    K: Ord,
    V: Ord,
{
    fn cmp(&self, other: &Entry<K, V>) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl<K, V> PartialOrd for Entry<K, V>
where
    K: Ord,
    V: Ord,
{
    fn partial_cmp(&self, other: &Entry<K, V>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K, V> PartialEq for Entry<K, V>
where
    K: Ord,
    V: Ord,
{
    fn eq(&self, other: &Entry<K, V>) -> bool {
        self.value == other.value && self.key == other.key
    }
}

impl<K, V> Eq for Entry<K, V>
where
    K: Ord,
    V: Ord,
{
}
