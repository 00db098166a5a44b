//! Submitted form data.
//!
//! [`FormData`] is a multi-valued map of posted `application/x-www-form-urlencoded`
//! pairs. Widgets read their values out of it through
//! [`Widget::value_from_data`](crate::widgets::Widget::value_from_data).

use std::collections::HashMap;

/// A multi-valued map of submitted form pairs, in submission order per key.
///
/// # Examples
///
/// ```
/// use formcraft_forms::form_data::FormData;
///
/// let data = FormData::parse("fw=React&fw=Vue&name=Ada+Lovelace");
/// assert_eq!(data.get("name"), Some("Ada Lovelace"));
/// assert_eq!(data.get_list("fw"), Some(&["React".to_string(), "Vue".to_string()][..]));
/// assert_eq!(data.get("fw"), Some("Vue"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    data: HashMap<String, Vec<String>>,
}

impl FormData {
    /// Creates an empty `FormData`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an urlencoded body or query string.
    pub fn parse(body: &str) -> Self {
        url::form_urlencoded::parse(body.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Returns the last value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Returns all values for `key`.
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.data.get(key).map(Vec::as_slice)
    }

    /// Appends a value for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.entry(key.into()).or_default().push(value.into());
    }

    /// Returns `true` if `key` was submitted.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (k, v) in iter {
            data.append(k, v);
        }
        data
    }
}
