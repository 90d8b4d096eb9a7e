use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable catalog entry for one lecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureRecord {
    pub key: String,
    pub name: String,
    /// Raw category tag; blank means the lecture was not offered that year.
    pub category: String,
    pub credit: Decimal,
    /// Every column of the source row, keyed by header.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl LectureRecord {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        credit: Decimal,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            category: category.into(),
            credit,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(column.into(), value.into());
        self
    }

    /// Looks up a raw column, falling back to the named fields.
    pub fn field(&self, column: &str) -> Option<&str> {
        if let Some(value) = self.attributes.get(column) {
            return Some(value.as_str());
        }

        match column {
            "key" => Some(self.key.as_str()),
            "name" => Some(self.name.as_str()),
            "category" => Some(self.category.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate lecture keys in catalog: {}", .keys.join(", "))]
    DuplicateKey { keys: Vec<String> },
}

/// The full set of known lectures, shared read-only by every student in a run.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<LectureRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Indexes records by key. Every repeated key is reported, not just the first.
    pub fn load(records: Vec<LectureRecord>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(records.len());
        let mut duplicates = Vec::new();

        for (position, record) in records.iter().enumerate() {
            if index.insert(record.key.clone(), position).is_some()
                && !duplicates.contains(&record.key)
            {
                duplicates.push(record.key.clone());
            }
        }

        if !duplicates.is_empty() {
            return Err(CatalogError::DuplicateKey { keys: duplicates });
        }

        Ok(Self { records, index })
    }

    pub fn get(&self, key: &str) -> Option<&LectureRecord> {
        self.index.get(key).map(|&position| &self.records[position])
    }

    pub fn records(&self) -> &[LectureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_undefined<'a, I>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        keys.into_iter()
            .filter(|key| !self.index.contains_key(*key))
            .filter(|key| seen.insert(*key))
            .map(str::to_string)
            .collect()
    }

    /// Distinct non-blank values of a column, in first-seen order.
    pub fn categories_of(&self, column: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter_map(|record| record.field(column))
            .map(str::trim)
            .filter(|value| !is_blank(value))
            .filter(|value| seen.insert(*value))
            .map(str::to_string)
            .collect()
    }
}

fn is_blank(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("nan")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecture(key: &str, category: &str) -> LectureRecord {
        LectureRecord::new(key, format!("{key} title"), category, Decimal::from(2))
    }

    #[test]
    fn load_indexes_by_key() {
        let catalog = Catalog::load(vec![lecture("A1", "Major"), lecture("B1", "Liberal")])
            .expect("catalog loads");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("B1").map(|record| record.category.as_str()), Some("Liberal"));
        assert!(catalog.get("C1").is_none());
    }

    #[test]
    fn duplicate_keys_are_fatal_and_listed_once() {
        let err = Catalog::load(vec![
            lecture("A1", "Major"),
            lecture("A1", "Major"),
            lecture("B1", "Liberal"),
            lecture("A1", "Liberal"),
            lecture("B1", "Liberal"),
        ])
        .expect_err("duplicates rejected");

        assert_eq!(
            err,
            CatalogError::DuplicateKey {
                keys: vec!["A1".to_string(), "B1".to_string()],
            }
        );
        assert_eq!(err.to_string(), "duplicate lecture keys in catalog: A1, B1");
    }

    #[test]
    fn find_undefined_dedups_missing_keys() {
        let catalog = Catalog::load(vec![lecture("A1", "Major")]).expect("catalog loads");
        let missing = catalog.find_undefined(["Z9", "A1", "Y8", "Z9"]);
        assert_eq!(missing, vec!["Z9".to_string(), "Y8".to_string()]);
    }

    #[test]
    fn categories_of_skips_blank_and_nan() {
        let catalog = Catalog::load(vec![
            lecture("A1", "Major").with_attribute("track", "Science"),
            lecture("A2", "").with_attribute("track", "nan"),
            lecture("A3", "Liberal").with_attribute("track", "Science"),
            lecture("A4", "Major").with_attribute("track", "Arts"),
        ])
        .expect("catalog loads");

        assert_eq!(catalog.categories_of("category"), vec!["Major", "Liberal"]);
        assert_eq!(catalog.categories_of("track"), vec!["Science", "Arts"]);
        assert!(catalog.categories_of("missing").is_empty());
    }
}
