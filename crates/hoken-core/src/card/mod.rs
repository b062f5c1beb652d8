//! Insurance-card field extraction: matchers, scorer, extractors, finders
//! and per-category analyzers.

pub mod analyzer;
pub mod extract;
pub mod finders;
pub mod matchers;
pub mod patterns;
pub mod preprocess;
pub mod score;

pub use analyzer::{Analyzer, AnalyzerKind};
pub use matchers::{MatchResult, RoleMatcher};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Output fields an analyzer can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    /// 保険者番号
    InsurerNumber,
    /// 記号
    Code,
    /// 番号
    CodeNumber,
    /// 枝番
    Branch,
    /// 受給者番号
    RecipientNumber,
    /// 生年月日
    Birthday,
    /// 有効開始日
    ValidFrom,
    /// 有効終了日
    ValidUntil,
    /// 交付年月日
    IssueDate,
    /// 資格取得日
    QualificationDate,
    /// 負担割合・適用区分
    PercentageCategory,
    /// 限度額
    DeductibleLimit,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::InsurerNumber => "InsurerNumber",
            Field::Code => "Code",
            Field::CodeNumber => "CodeNumber",
            Field::Branch => "Branch",
            Field::RecipientNumber => "RecipientNumber",
            Field::Birthday => "Birthday",
            Field::ValidFrom => "ValidFrom",
            Field::ValidUntil => "ValidUntil",
            Field::IssueDate => "IssueDate",
            Field::QualificationDate => "QualificationDate",
            Field::PercentageCategory => "PercentageCategory",
            Field::DeductibleLimit => "DeductibleLimit",
        };
        f.write_str(name)
    }
}

/// Resolved field values. Absent keys are unresolved, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    values: BTreeMap<Field, String>,
}

impl FieldMap {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn has(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Set when `value` is present, leave unresolved otherwise.
    pub fn set_opt(&mut self, field: Field, value: Option<String>) {
        if let Some(value) = value {
            self.values.insert(field, value);
        }
    }

    /// Fold another fragment in; its entries win on overlap.
    pub fn merge(&mut self, other: FieldMap) {
        self.values.extend(other.values);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// JSON object over `fields`, with `null` for unresolved entries.
    pub fn to_json(&self, fields: &[Field]) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for field in fields {
            let value = self
                .get(*field)
                .map(|v| serde_json::Value::String(v.to_string()))
                .unwrap_or(serde_json::Value::Null);
            object.insert(field.to_string(), value);
        }
        serde_json::Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_map_basics() {
        let mut map = FieldMap::default();
        assert!(!map.has(Field::Birthday));
        map.set(Field::Birthday, "19870310");
        assert_eq!(map.get(Field::Birthday), Some("19870310"));
        map.set_opt(Field::Branch, None);
        assert!(!map.has(Field::Branch));
    }

    #[test]
    fn test_merge_later_wins() {
        let mut a = FieldMap::default();
        a.set(Field::Code, "1");
        let mut b = FieldMap::default();
        b.set(Field::Code, "2");
        a.merge(b);
        assert_eq!(a.get(Field::Code), Some("2"));
    }

    #[test]
    fn test_to_json_nulls_unresolved() {
        let mut map = FieldMap::default();
        map.set(Field::Birthday, "19870310");
        let json = map.to_json(&[Field::Birthday, Field::ValidFrom]);
        assert_eq!(json["Birthday"], "19870310");
        assert!(json["ValidFrom"].is_null());
    }
}
