//! Multi-valued dictionary for query strings and form bodies.
//!
//! [`QueryDict`] keeps every value submitted for a key, so a checkbox group
//! such as `drivers=1&drivers=3` survives parsing. Single-value lookups
//! return the last value, as browsers submit the most recent one last.

use std::collections::HashMap;

/// A dictionary of decoded `application/x-www-form-urlencoded` pairs.
///
/// # Examples
///
/// ```
/// use taxi_core::QueryDict;
///
/// let qd = QueryDict::parse("model=Model+S&drivers=1&drivers=3");
/// assert_eq!(qd.get("model"), Some("Model S"));
/// assert_eq!(qd.get_list("drivers"), ["1", "3"]);
/// assert_eq!(qd.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    data: HashMap<String, Vec<String>>,
}

impl QueryDict {
    /// Creates an empty `QueryDict`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query string or form body.
    ///
    /// Percent-escapes are decoded and `+` becomes a space. Pairs without
    /// `=` are kept with an empty value.
    pub fn parse(query_string: &str) -> Self {
        let mut qd = Self::new();
        for (key, value) in url::form_urlencoded::parse(query_string.as_bytes()) {
            qd.append(&key, &value);
        }
        qd
    }

    /// Builds a `QueryDict` from single-valued pairs.
    pub fn from_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut qd = Self::new();
        for (key, value) in pairs {
            qd.append(key.as_ref(), value.as_ref());
        }
        qd
    }

    /// Returns the last value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Returns every value for `key`, or an empty slice.
    pub fn get_list(&self, key: &str) -> &[String] {
        self.data.get(key).map_or(&[], Vec::as_slice)
    }

    /// Appends a value for `key`.
    pub fn append(&mut self, key: &str, value: &str) {
        self.data
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Replaces all values for `key` with one value.
    pub fn set(&mut self, key: &str, value: &str) {
        self.data.insert(key.to_string(), vec![value.to_string()]);
    }

    /// Removes `key`, returning its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.data.remove(key)
    }

    /// Returns `true` if `key` was submitted at all.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns `true` if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Encodes the dictionary back into a query string with sorted keys.
    pub fn urlencode(&self) -> String {
        let mut keys: Vec<&String> = self.data.keys().collect();
        keys.sort();
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for key in keys {
            for value in &self.data[key] {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let qd = QueryDict::parse("");
        assert!(qd.is_empty());
        assert_eq!(qd.get("name"), None);
        assert!(qd.get_list("name").is_empty());
    }

    #[test]
    fn test_parse_percent_and_plus() {
        let qd = QueryDict::parse("name=Mercedes%2DBenz&country=South+Korea");
        assert_eq!(qd.get("name"), Some("Mercedes-Benz"));
        assert_eq!(qd.get("country"), Some("South Korea"));
    }

    #[test]
    fn test_last_value_wins() {
        let qd = QueryDict::parse("username=a&username=b");
        assert_eq!(qd.get("username"), Some("b"));
        assert_eq!(qd.get_list("username"), ["a", "b"]);
    }

    #[test]
    fn test_key_without_value() {
        let qd = QueryDict::parse("model");
        assert!(qd.contains_key("model"));
        assert_eq!(qd.get("model"), Some(""));
    }

    #[test]
    fn test_set_replaces() {
        let mut qd = QueryDict::parse("q=a&q=b");
        qd.set("q", "c");
        assert_eq!(qd.get_list("q"), ["c"]);
    }

    #[test]
    fn test_remove() {
        let mut qd = QueryDict::parse("q=a&manufacturer=2");
        assert_eq!(qd.remove("manufacturer"), Some(vec!["2".to_string()]));
        assert_eq!(qd.urlencode(), "q=a");
    }

    #[test]
    fn test_urlencode_sorted() {
        let qd = QueryDict::from_pairs([("model", "Model S"), ("a", "1")]);
        assert_eq!(qd.urlencode(), "a=1&model=Model+S");
    }
}
