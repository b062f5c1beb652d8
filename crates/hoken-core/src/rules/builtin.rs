use super::schema::{CompiledTable, PatternTable};
use crate::error::Result;

const INSURANCE_CARD_JSON: &str = include_str!("../../../../rules/insurance-card.json");

/// The default pattern table for Japanese insurance cards.
///
/// Label vocabularies mirror the wordings observed on 主保険 and 公費 cards,
/// including their recurring OCR misreadings.
pub fn insurance_card() -> Result<PatternTable> {
    let table: PatternTable = serde_json::from_str(INSURANCE_CARD_JSON)?;
    Ok(table)
}

/// The default table, compiled.
pub fn insurance_card_compiled() -> Result<CompiledTable> {
    insurance_card()?.compile()
}
