//! Row-to-replacement mapping using the `{{column}}` token convention.

use crate::data::{DataSet, Row};
use crate::error::{Error, Result};

/// Opening delimiter of a placeholder token.
pub const TOKEN_OPEN: &str = "{{";

/// Closing delimiter of a placeholder token.
pub const TOKEN_CLOSE: &str = "}}";

/// Build the placeholder token for a column name.
pub fn token(column: &str) -> String {
    format!("{TOKEN_OPEN}{column}{TOKEN_CLOSE}")
}

/// Ordered token → value lookup for one row.
///
/// Entries keep insertion order, which is also the order in which the
/// substituter tries them against each run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    entries: Vec<(String, String)>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map for one row: one `{{column}}` entry per header column.
    ///
    /// Fails if the row has no value for one of the columns.
    pub fn from_row(columns: &[String], row: &Row) -> Result<Self> {
        let mut map = Self::new();
        for (idx, column) in columns.iter().enumerate() {
            let value = row.value(idx).ok_or_else(|| Error::MissingColumn {
                column: column.clone(),
                line: row.line,
            })?;
            map.insert(token(column), value);
        }
        Ok(map)
    }

    /// Build the map for a row of a data set.
    pub fn for_row(data: &DataSet, row: &Row) -> Result<Self> {
        Self::from_row(&data.columns, row)
    }

    /// Insert or overwrite an entry. Overwriting keeps the original position.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    /// Value for a token.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over (token, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Into<String>, V: Into<String>> FromIterator<(T, V)> for ReplacementMap {
    fn from_iter<I: IntoIterator<Item = (T, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (t, v) in iter {
            map.insert(t, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_token() {
        assert_eq!(token("name"), "{{name}}");
        assert_eq!(token("Event Date"), "{{Event Date}}");
    }

    #[test]
    fn test_one_entry_per_column() {
        let cols = columns(&["name", "score", "date"]);
        let row = Row::new(2, ["Ada Lovelace", "97.5", "2024-03-01"]);
        let map = ReplacementMap::from_row(&cols, &row).unwrap();

        assert_eq!(map.len(), cols.len());
        let keys: Vec<&str> = map.iter().map(|(t, _)| t).collect();
        assert_eq!(keys, vec!["{{name}}", "{{score}}", "{{date}}"]);
        assert_eq!(map.get("{{score}}"), Some("97.5"));
        assert_eq!(map.get("{{date}}"), Some("2024-03-01"));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let cols = columns(&["name"]);
        let row = Row::new(2, ["Ada", "stray"]);
        let map = ReplacementMap::from_row(&cols, &row).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_missing_column_fails() {
        let cols = columns(&["name", "score"]);
        let row = Row::new(4, ["Bob"]);
        let err = ReplacementMap::from_row(&cols, &row).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column, line: 4 } if column == "score"));
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut map: ReplacementMap = [("{{a}}", "1"), ("{{b}}", "2")].into_iter().collect();
        map.insert("{{a}}", "3");
        let pairs: Vec<(&str, &str)> = map.iter().collect();
        assert_eq!(pairs, vec![("{{a}}", "3"), ("{{b}}", "2")]);
    }
}
