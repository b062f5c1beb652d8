//! Typed pattern-table schema.
//!
//! A table maps each semantic role to an ordered list of matcher variants,
//! tried first-match-wins. Tables are plain JSON configuration, validated
//! eagerly at load time and compiled once; nothing is resolved by name during
//! extraction.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::fuzzy;
use crate::error::{HokenError, Result};

/// Semantic roles a pattern table can match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Birthday,
    ValidFrom,
    ValidUntil,
    IssueDate,
    InsurerNumber,
    RecipientNumber,
    QualificationDate,
    Branch,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Birthday,
        Role::ValidFrom,
        Role::ValidUntil,
        Role::IssueDate,
        Role::InsurerNumber,
        Role::RecipientNumber,
        Role::QualificationDate,
        Role::Branch,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Birthday => "Birthday",
            Role::ValidFrom => "ValidFrom",
            Role::ValidUntil => "ValidUntil",
            Role::IssueDate => "IssueDate",
            Role::InsurerNumber => "InsurerNumber",
            Role::RecipientNumber => "RecipientNumber",
            Role::QualificationDate => "QualificationDate",
            Role::Branch => "Branch",
        };
        f.write_str(name)
    }
}

/// How a pattern variant is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Literal substring.
    Exact,
    /// Substring within an edit-distance budget.
    Fuzzy,
    /// Regular expression.
    Regex,
}

/// One matcher variant within a role's ordered list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDef {
    pub kind: PatternKind,
    pub pattern: String,
    /// Edit-distance budget; fuzzy variants only.
    #[serde(default)]
    pub max_edits: u32,
}

/// A pattern table: role -> ordered matcher variants, first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternTable {
    pub name: String,
    pub version: String,
    pub roles: BTreeMap<Role, Vec<PatternDef>>,
}

impl PatternTable {
    /// Validate and compile every variant. All errors surface here, at load
    /// time, never during extraction.
    pub fn compile(&self) -> Result<CompiledTable> {
        for role in Role::ALL {
            match self.roles.get(&role) {
                None => {
                    return Err(HokenError::TableInvalid(format!(
                        "role {role} has no pattern list"
                    )))
                }
                Some(defs) if defs.is_empty() => {
                    return Err(HokenError::TableInvalid(format!(
                        "role {role} has an empty pattern list"
                    )))
                }
                Some(_) => {}
            }
        }

        let mut roles = BTreeMap::new();
        for (&role, defs) in &self.roles {
            let mut compiled = Vec::with_capacity(defs.len());
            for def in defs {
                compiled.push(compile_pattern(role, def)?);
            }
            roles.insert(role, compiled);
        }
        Ok(CompiledTable { roles })
    }
}

fn compile_pattern(role: Role, def: &PatternDef) -> Result<CompiledPattern> {
    if def.pattern.is_empty() {
        return Err(HokenError::Pattern {
            role: role.to_string(),
            reason: "empty pattern".into(),
        });
    }
    match def.kind {
        PatternKind::Exact | PatternKind::Regex if def.max_edits > 0 => Err(HokenError::Pattern {
            role: role.to_string(),
            reason: format!("max_edits is only valid for fuzzy patterns: {}", def.pattern),
        }),
        PatternKind::Exact => Ok(CompiledPattern::Exact(def.pattern.clone())),
        PatternKind::Fuzzy => {
            let len = def.pattern.chars().count() as u32;
            if def.max_edits >= len {
                return Err(HokenError::Pattern {
                    role: role.to_string(),
                    reason: format!(
                        "max_edits {} must be smaller than pattern length {len}: {}",
                        def.max_edits, def.pattern
                    ),
                });
            }
            Ok(CompiledPattern::Fuzzy {
                pattern: def.pattern.clone(),
                max_edits: def.max_edits,
            })
        }
        PatternKind::Regex => {
            let re = Regex::new(&def.pattern).map_err(|e| HokenError::Pattern {
                role: role.to_string(),
                reason: e.to_string(),
            })?;
            Ok(CompiledPattern::Regex(re))
        }
    }
}

/// A compiled matcher variant.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    Exact(String),
    Fuzzy { pattern: String, max_edits: u32 },
    Regex(Regex),
}

impl CompiledPattern {
    /// Byte span of the first occurrence in `text`.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            CompiledPattern::Exact(p) => text.find(p.as_str()).map(|i| (i, i + p.len())),
            CompiledPattern::Fuzzy { pattern, max_edits } => {
                fuzzy::find_within(text, pattern, *max_edits)
            }
            CompiledPattern::Regex(re) => re.find(text).map(|m| (m.start(), m.end())),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }
}

/// A validated, fully compiled pattern table.
#[derive(Debug, Clone, Default)]
pub struct CompiledTable {
    roles: BTreeMap<Role, Vec<CompiledPattern>>,
}

impl CompiledTable {
    /// Ordered variants for a role. Empty when the role is absent, which a
    /// validated table never is.
    pub fn patterns(&self, role: Role) -> &[CompiledPattern] {
        self.roles.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(kind: PatternKind, pattern: &str, max_edits: u32) -> PatternDef {
        PatternDef {
            kind,
            pattern: pattern.into(),
            max_edits,
        }
    }

    fn single_role_table(defs: Vec<PatternDef>) -> PatternTable {
        let mut roles = BTreeMap::new();
        for role in Role::ALL {
            roles.insert(role, vec![def(PatternKind::Exact, "x", 0)]);
        }
        roles.insert(Role::Birthday, defs);
        PatternTable {
            name: "test".into(),
            version: "1.0".into(),
            roles,
        }
    }

    #[test]
    fn test_missing_role_rejected() {
        let mut table = single_role_table(vec![def(PatternKind::Exact, "生年月日", 0)]);
        table.roles.remove(&Role::Branch);
        assert!(table.compile().is_err());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let table = single_role_table(vec![def(PatternKind::Exact, "", 0)]);
        assert!(table.compile().is_err());
    }

    #[test]
    fn test_oversized_budget_rejected() {
        let table = single_role_table(vec![def(PatternKind::Fuzzy, "生年", 2)]);
        assert!(table.compile().is_err());
    }

    #[test]
    fn test_budget_on_exact_rejected() {
        let table = single_role_table(vec![def(PatternKind::Exact, "生年月日", 1)]);
        assert!(table.compile().is_err());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let table = single_role_table(vec![def(PatternKind::Regex, "(unclosed", 0)]);
        assert!(table.compile().is_err());
    }

    #[test]
    fn test_unknown_role_key_rejected_by_serde() {
        let json = r#"{
            "name": "t",
            "version": "1.0",
            "roles": { "NotARole": [] }
        }"#;
        assert!(serde_json::from_str::<PatternTable>(json).is_err());
    }

    #[test]
    fn test_compiled_find_spans() {
        let table = single_role_table(vec![def(PatternKind::Fuzzy, "生年月日", 2)]);
        let compiled = table.compile().unwrap();
        let patterns = compiled.patterns(Role::Birthday);
        assert!(patterns[0].find("XX生年月日YY").is_some());
    }
}
