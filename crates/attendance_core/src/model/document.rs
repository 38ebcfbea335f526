//! Top-level persisted attendance document.
//!
//! # Responsibility
//! - Own the `{daily, students, semester}` shape written to the blob store.
//! - Keep student aggregates in first-sighting order across save/load.
//!
//! # Invariants
//! - `students` holds at most one aggregate per `studentName_department` key.
//! - A daily bucket holds at most one record per `(studentName, department)`.

use crate::model::record::DailyRecord;
use crate::model::semester::SemesterConfig;
use crate::model::student::StudentAggregate;
use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Formatter;

/// Whole attendance state as persisted under the storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub daily: BTreeMap<NaiveDate, Vec<DailyRecord>>,
    #[serde(default)]
    pub students: StudentBook,
    pub semester: SemesterConfig,
}

impl StoreDocument {
    /// Initial empty document for a store first opened with `semester`.
    pub fn seeded(semester: SemesterConfig) -> Self {
        Self {
            daily: BTreeMap::new(),
            students: StudentBook::default(),
            semester,
        }
    }

    pub fn daily_on(&self, date: NaiveDate) -> &[DailyRecord] {
        self.daily.get(&date).map_or(&[], Vec::as_slice)
    }

    /// Maps `(studentName, department)` to the record's position in one
    /// date bucket.
    pub fn identity_index(&self, date: NaiveDate) -> HashMap<(&str, &str), usize> {
        self.daily_on(date)
            .iter()
            .enumerate()
            .map(|(position, record)| {
                (
                    (record.student_name.as_str(), record.department.as_str()),
                    position,
                )
            })
            .collect()
    }
}

/// Student aggregates keyed by `studentName_department`, iterated in the
/// order students were first seen.
///
/// Serialized as a JSON object; key order on disk is the iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentBook {
    entries: Vec<StudentAggregate>,
    positions: HashMap<String, usize>,
}

impl StudentBook {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&StudentAggregate> {
        self.positions.get(key).map(|&index| &self.entries[index])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut StudentAggregate> {
        let index = *self.positions.get(key)?;
        Some(&mut self.entries[index])
    }

    /// Returns the aggregate for `student_name`/`department`, creating an
    /// empty one at the end of the book on first sighting.
    pub fn get_or_insert(&mut self, student_name: &str, department: &str) -> &mut StudentAggregate {
        let aggregate = StudentAggregate::new(student_name, department);
        let key = aggregate.key();
        let existing = self.positions.get(&key).copied();
        let index = match existing {
            Some(index) => index,
            None => self.push(key, aggregate),
        };
        &mut self.entries[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StudentAggregate> {
        self.entries.iter()
    }

    fn push(&mut self, key: String, aggregate: StudentAggregate) -> usize {
        let index = self.entries.len();
        self.entries.push(aggregate);
        self.positions.insert(key, index);
        index
    }
}

impl<'a> IntoIterator for &'a StudentBook {
    type Item = &'a StudentAggregate;
    type IntoIter = std::slice::Iter<'a, StudentAggregate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for StudentBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for aggregate in &self.entries {
            map.serialize_entry(&aggregate.key(), aggregate)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StudentBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StudentBookVisitor)
    }
}

struct StudentBookVisitor;

impl<'de> Visitor<'de> for StudentBookVisitor {
    type Value = StudentBook;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a map of student aggregates")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut book = StudentBook::default();
        // Stored keys are ignored; the key is re-derived from the aggregate.
        while let Some((_, aggregate)) = access.next_entry::<String, StudentAggregate>()? {
            let key = aggregate.key();
            match book.positions.get(&key).copied() {
                Some(index) => book.entries[index] = aggregate,
                None => {
                    book.push(key, aggregate);
                }
            }
        }
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreDocument, StudentBook};
    use crate::model::semester::SemesterConfig;
    use chrono::NaiveDate;

    fn semester() -> SemesterConfig {
        SemesterConfig::starting(NaiveDate::from_ymd_opt(2026, 2, 16).unwrap(), 4, 20)
    }

    #[test]
    fn student_book_keeps_first_sighting_order_through_json() {
        let mut document = StoreDocument::seeded(semester());
        for name in ["Zain", "Ahmad", "Maryam"] {
            document.students.get_or_insert(name, "CS-3rd");
        }
        document.students.get_or_insert("Zain", "CS-3rd");

        let json = serde_json::to_string(&document).unwrap();
        let decoded: StoreDocument = serde_json::from_str(&json).unwrap();

        let names: Vec<&str> = decoded
            .students
            .iter()
            .map(|student| student.student_name.as_str())
            .collect();
        assert_eq!(names, vec!["Zain", "Ahmad", "Maryam"]);
        assert!(decoded.students.get("Ahmad_CS-3rd").is_some());
    }

    #[test]
    fn seeded_document_uses_expected_wire_fields() {
        let value = serde_json::to_value(StoreDocument::seeded(semester())).unwrap();

        assert_eq!(value["daily"], serde_json::json!({}));
        assert_eq!(value["students"], serde_json::json!({}));
        assert_eq!(value["semester"]["startDate"], "2026-02-16");
        assert_eq!(value["semester"]["endDate"], "2026-06-16");
        assert_eq!(value["semester"]["totalWeeks"], 20);
        assert_eq!(value["semester"]["currentWeek"], 1);
    }

    #[test]
    fn empty_book_reports_empty() {
        let book = StudentBook::default();
        assert!(book.is_empty());
        assert_eq!(book.len(), 0);
        assert!(book.get("missing").is_none());
    }
}
