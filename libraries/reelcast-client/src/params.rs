//! Ordered query parameters with nested bracket flattening.

use url::form_urlencoded;

/// A query parameter value: a scalar, or a nested map rendered with
/// bracket notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A plain value, percent-encoded when rendered
    Value(String),
    /// A nested map, flattened as `outer[inner]=value`
    Nested(Params),
}

/// An ordered string-keyed parameter map.
///
/// Iteration order is insertion order, so the rendered query string is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style scalar insert.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style nested insert.
    pub fn set_nested(mut self, key: impl Into<String>, value: Params) -> Self {
        self.entries.push((key.into(), ParamValue::Nested(value)));
        self
    }

    /// Appends a scalar entry, keeping insertion order.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .push((key.into(), ParamValue::Value(value.into())));
    }

    /// Appends an entry with an explicit value, keeping insertion order.
    pub fn insert_entry(&mut self, key: impl Into<String>, value: ParamValue) {
        self.entries.push((key.into(), value));
    }

    /// Removes and returns the first entry with the given key.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// The first value stored under the given key.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Whether any entry uses the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, ParamValue)> {
        self.entries.iter()
    }

    /// Appends all entries of `other` after the entries of `self`.
    pub fn merge(mut self, other: Params) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Renders `k=v` pairs joined by `&`, percent-encoding each value.
    ///
    /// Nested maps flatten recursively with bracket notation, so
    /// `{a: {b: {c: 1}}}` renders as `a[b][c]=1`.
    pub fn to_query_string(&self) -> String {
        self.render("&")
    }

    /// Renders the query string with an explicit pair joiner.
    pub fn render(&self, joiner: &str) -> String {
        self.entries
            .iter()
            .map(|(key, value)| render_pair(key, value, joiner))
            .collect::<Vec<_>>()
            .join(joiner)
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a (String, ParamValue);
    type IntoIter = std::slice::Iter<'a, (String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn render_pair(key: &str, value: &ParamValue, joiner: &str) -> String {
    match value {
        ParamValue::Value(v) => format!("{}={}", key, encode(v)),
        ParamValue::Nested(params) => params
            .entries
            .iter()
            .map(|(k, v)| render_pair(&format!("{}[{}]", key, k), v, joiner))
            .collect::<Vec<_>>()
            .join(joiner),
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Wraps each key of `params` as `{wrapper}[{key}]`, skipping keys that
/// are already wrapped (the key starts with `"{wrapper}["`).
///
/// Update endpoints accept their fields in wrapped form; this lets
/// callers pass either `title` or `video[title]` interchangeably.
pub fn wrap_update_params(params: &Params, wrapper: &str) -> Params {
    let prefix = format!("{}[", wrapper);
    let mut wrapped = Params::new();
    for (key, value) in params.iter() {
        let key = if key.starts_with(&prefix) {
            key.clone()
        } else {
            format!("{}[{}]", wrapper, key)
        };
        wrapped.insert_entry(key, value.clone());
    }
    wrapped
}
