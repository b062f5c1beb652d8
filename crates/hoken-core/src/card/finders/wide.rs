//! Best-score finder.

use std::cmp::Reverse;

use crate::models::Page;
use crate::rules::{CompiledTable, Role};

use super::super::score::score_lines;
use super::super::{Field, FieldMap};
use super::ExtractKind;

/// Scores the whole page with neighbor extension and extracts from the
/// highest-scoring lines first, so a value split from its label onto the
/// next line is still found.
#[derive(Debug, Clone, Copy)]
pub struct WideFinder {
    pub field: Field,
    pub role: Role,
    pub extract: ExtractKind,
}

impl WideFinder {
    pub fn run(&self, table: &CompiledTable, page: &Page) -> FieldMap {
        let matcher = table.matcher(self.role);
        let scored = score_lines(&matcher, page, true);
        let mut order: Vec<usize> = (0..page.len()).collect();
        order.sort_by_key(|&line| Reverse(scored.scores[line]));

        let mut map = FieldMap::default();
        for line in order {
            if scored.scores[line] == 0 {
                break;
            }
            if let Some(value) = self.extract.apply(&scored.texts[line]) {
                map.set(self.field, value);
                break;
            }
        }
        map
    }
}
