//! Multi-valued parameter maps for query strings and form bodies.

/// An ordered map from parameter names to one or more values.
///
/// Keys keep the order in which they were first seen, which keeps
/// [`urlencode`](QueryDict::urlencode) output stable.
///
/// # Examples
///
/// ```
/// use brackets_http::QueryDict;
///
/// let qd = QueryDict::parse("order_by=title&order_by=author&order_dir=DESC");
/// assert_eq!(qd.get("order_by"), Some("author"));
/// assert_eq!(qd.get_list("order_by"), vec!["title", "author"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryDict {
    /// Creates an empty `QueryDict`.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parses `application/x-www-form-urlencoded` text.
    ///
    /// `+` decodes to a space and percent escapes are decoded lossily.
    /// A pair without `=` is kept with an empty value.
    pub fn parse(query_string: &str) -> Self {
        let mut qd = Self::new();
        for pair in query_string.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            qd.append(&decode(key), &decode(value));
        }
        qd
    }

    /// Returns the last value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Returns every value for `key`, empty when absent.
    pub fn get_list(&self, key: &str) -> Vec<&str> {
        self.values(key)
            .map(|values| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Replaces all values for `key` with `value`.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => *values = vec![value.to_string()],
            None => self
                .entries
                .push((key.to_string(), vec![value.to_string()])),
        }
    }

    /// Adds `value` to the values for `key`.
    pub fn append(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value.to_string()),
            None => self
                .entries
                .push((key.to_string(), vec![value.to_string()])),
        }
    }

    /// Removes `key`, returning its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Encodes the map back into a query string.
    pub fn urlencode(&self) -> String {
        self.urlencode_safe("")
    }

    /// Encodes the map, leaving the characters in `safe` unescaped.
    ///
    /// ```
    /// use brackets_http::QueryDict;
    ///
    /// let mut qd = QueryDict::new();
    /// qd.set("next", "/private/?page=2");
    /// assert_eq!(qd.urlencode_safe("/"), "next=/private/%3Fpage%3D2");
    /// ```
    pub fn urlencode_safe(&self, safe: &str) -> String {
        let quote = |input: &str| {
            safe.chars().fold(encode(input), |acc, c| {
                acc.replace(&format!("%{:02X}", u32::from(c)), &c.to_string())
            })
        };
        self.entries
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", quote(key.as_str()), quote(value.as_str())))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values(key).is_some()
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over `(key, last value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(k, values)| {
            values.last().map(|v| (k.as_str(), v.as_str()))
        })
    }

    fn values(&self, key: &str) -> Option<&Vec<String>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values)
    }
}

fn decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Characters escaped in a query component: everything but `A-Z a-z 0-9 - _ . ~`.
const QUERY_COMPONENT: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encodes a query component.
pub fn encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, QUERY_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert!(QueryDict::parse("").is_empty());
        assert!(QueryDict::parse("&&").is_empty());
    }

    #[test]
    fn test_parse_multiple_values_last_wins() {
        let qd = QueryDict::parse("color=red&color=blue");
        assert_eq!(qd.get("color"), Some("blue"));
        assert_eq!(qd.get_list("color"), vec!["red", "blue"]);
        assert_eq!(qd.len(), 1);
    }

    #[test]
    fn test_parse_decoding() {
        let qd = QueryDict::parse("next=%2Faccounts%2Fprofile%2F%3Ftab%3D1&q=hello+world");
        assert_eq!(qd.get("next"), Some("/accounts/profile/?tab=1"));
        assert_eq!(qd.get("q"), Some("hello world"));
    }

    #[test]
    fn test_parse_key_without_value() {
        let qd = QueryDict::parse("flag&x=1");
        assert_eq!(qd.get("flag"), Some(""));
        assert!(qd.contains_key("flag"));
    }

    #[test]
    fn test_get_list_missing_is_empty() {
        let qd = QueryDict::new();
        assert!(qd.get_list("missing").is_empty());
        assert_eq!(qd.get("missing"), None);
    }

    #[test]
    fn test_set_replaces_and_append_adds() {
        let mut qd = QueryDict::parse("a=1&a=2");
        qd.set("a", "3");
        assert_eq!(qd.get_list("a"), vec!["3"]);
        qd.append("a", "4");
        qd.append("b", "5");
        assert_eq!(qd.get_list("a"), vec!["3", "4"]);
        assert_eq!(qd.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut qd = QueryDict::parse("a=1&b=2");
        assert_eq!(qd.remove("a"), Some(vec!["1".to_string()]));
        assert_eq!(qd.remove("a"), None);
        assert_eq!(qd.len(), 1);
    }

    #[test]
    fn test_urlencode_keeps_order() {
        let qd = QueryDict::parse("page=2&next=/a b/");
        assert_eq!(qd.urlencode(), "page=2&next=%2Fa%20b%2F");
    }

    #[test]
    fn test_urlencode_safe_and_unreserved() {
        let mut qd = QueryDict::new();
        qd.set("next", "/a_b-c.d~e/");
        assert_eq!(qd.urlencode(), "next=%2Fa_b-c.d~e%2F");
        assert_eq!(qd.urlencode_safe("/"), "next=/a_b-c.d~e/");
    }

    #[test]
    fn test_iter_last_values() {
        let qd = QueryDict::parse("a=1&a=2&b=3");
        let pairs: Vec<_> = qd.iter().collect();
        assert_eq!(pairs, vec![("a", "2"), ("b", "3")]);
    }
}
