//! Series identity.
//!
//! A `LabelSet` keeps its pairs in a `BTreeMap`, so equality and hashing see
//! labels sorted by name no matter how the set was built. `SeriesKey` pairs it
//! with the metric name and is hashed directly.

use std::collections::BTreeMap;

/// Fixed label carrying the (resolved) emitting host.
pub const HOST_LABEL: &str = "host";
/// Fixed label carrying the emitting service.
pub const SERVICE_LABEL: &str = "service";

/// Label name -> value, canonically ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a label.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs in canonical (name-sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// (metric name, canonical label set).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub metric: String,
    pub labels: LabelSet,
}

impl SeriesKey {
    pub fn new(metric: impl Into<String>, labels: LabelSet) -> Self {
        Self {
            metric: metric.into(),
            labels,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(t: &T) -> u64 {
        let mut h = DefaultHasher::new();
        t.hash(&mut h);
        h.finish()
    }

    #[test]
    fn construction_order_does_not_change_identity() {
        let mut a = LabelSet::new();
        a.insert("service", "druid/broker");
        a.insert("host", "h:8082");
        a.insert("dataSource", "");

        let b: LabelSet = [("dataSource", ""), ("host", "h:8082"), ("service", "druid/broker")]
            .into_iter()
            .collect();

        assert_eq!(a, b);
        let ka = SeriesKey::new("query/time", a);
        let kb = SeriesKey::new("query/time", b);
        assert_eq!(ka, kb);
        assert_eq!(hash_of(&ka), hash_of(&kb));
    }

    #[test]
    fn iteration_is_name_sorted() {
        let ls: LabelSet = [("service", "s"), ("host", "h"), ("a", "1")].into_iter().collect();
        let names: Vec<&str> = ls.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "host", "service"]);
    }

    #[test]
    fn metric_name_is_part_of_identity() {
        let ls: LabelSet = [("host", "h")].into_iter().collect();
        assert_ne!(SeriesKey::new("a", ls.clone()), SeriesKey::new("b", ls));
    }
}
