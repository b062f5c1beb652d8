//! Direct single-match finder.

use crate::models::Page;
use crate::rules::{CompiledTable, Role};

use super::super::{Field, FieldMap};
use super::ExtractKind;

/// Applies its extractor to the first line its role matcher hits.
#[derive(Debug, Clone, Copy)]
pub struct SimpleFinder {
    pub field: Field,
    pub role: Role,
    pub extract: ExtractKind,
}

impl SimpleFinder {
    pub fn run(&self, table: &CompiledTable, page: &Page) -> FieldMap {
        let matcher = table.matcher(self.role);
        let mut map = FieldMap::default();
        for line in page.texts() {
            let result = matcher.matches(line);
            if result.matched {
                map.set_opt(self.field, self.extract.apply(&result.text));
                break;
            }
        }
        map
    }
}
