//! Multi-role date disambiguation.
//!
//! Birth date, validity start, validity end and issue date all draw their
//! candidates from the same raw tokens of the same few lines. Resolution is
//! a greedy, priority-ordered sequence of passes: score each role per line,
//! let dominant lines claim their values, patch the known issue/until and
//! from/until pairings, assign by descending score threshold, and finally
//! fall back per role. A role that survives every pass unresolved stays
//! absent from the output.

use std::cmp::Reverse;

use tracing::debug;

use crate::models::{CalendarDate, Page};
use crate::rules::{CompiledTable, Role};

use super::super::extract::extract_dates;
use super::super::score::{extend_hits, score_lines};
use super::super::{Field, FieldMap};

/// Roles resolved together, in pass order. ValidUntil precedes ValidFrom:
/// the two labels sit one edit apart, and on a line carrying only 有効期限
/// the end-date reading must win the tie.
pub const DATE_ROLES: [Role; 4] = [
    Role::Birthday,
    Role::ValidUntil,
    Role::ValidFrom,
    Role::IssueDate,
];

const BIRTHDAY: usize = 0;
const UNTIL: usize = 1;
const FROM: usize = 2;
const ISSUE: usize = 3;

fn field_of(index: usize) -> Field {
    match index {
        BIRTHDAY => Field::Birthday,
        UNTIL => Field::ValidUntil,
        FROM => Field::ValidFrom,
        _ => Field::IssueDate,
    }
}

/// Finder resolving the four date roles at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatesFinder;

impl DatesFinder {
    pub fn run(&self, table: &CompiledTable, page: &Page) -> FieldMap {
        let mut map = FieldMap::default();
        if page.is_empty() {
            return map;
        }
        let resolution = resolve(table, page);
        for (index, date) in resolution.resolved.iter().enumerate() {
            if let Some(date) = date {
                map.set(field_of(index), date.canonical());
            }
        }
        map
    }
}

/// Per-call resolution state. Built fresh for every page; nothing survives
/// across documents.
struct Resolution {
    scores: [Vec<u32>; 4],
    candidates: [Vec<Vec<CalendarDate>>; 4],
    resolved: [Option<CalendarDate>; 4],
}

fn resolve(table: &CompiledTable, page: &Page) -> Resolution {
    let line_count = page.len();

    // Scores and located texts per role. Birth dates sit on one explicit
    // line together with their label, so the Birthday role extends to
    // neighbors and dominates its line; the other roles score strictly where
    // their label hits. A lone ValidUntil hit in the top two lines extends
    // too: up there the value is regularly segmented onto the next line.
    let mut scores: [Vec<u32>; 4] = Default::default();
    let mut texts: [Vec<String>; 4] = Default::default();
    for (index, role) in DATE_ROLES.into_iter().enumerate() {
        let matcher = table.matcher(role);
        let mut scored = score_lines(&matcher, page, role == Role::Birthday);
        if index == UNTIL && scored.scores.iter().take(2).sum::<u32>() == 1 {
            scored.scores = extend_hits(&scored.scores);
        }
        scores[index] = scored.scores;
        texts[index] = scored.texts;
    }

    // Candidates per role per line, from the matcher-located sub-texts of
    // positively scored lines only.
    let mut candidates: [Vec<Vec<CalendarDate>>; 4] = Default::default();
    for index in 0..DATE_ROLES.len() {
        candidates[index] = (0..line_count)
            .map(|line| {
                if scores[index][line] > 0 {
                    extract_dates(&texts[index][line])
                } else {
                    Vec::new()
                }
            })
            .collect();
    }

    let mut res = Resolution {
        scores,
        candidates,
        resolved: Default::default(),
    };

    suppress_claimed_lines(&mut res, line_count);
    drop_crowded_from(&mut res);
    assign_shared_validity_line(&mut res, line_count);
    assign_by_threshold(&mut res);
    assign_coinciding_validity(&mut res);
    assign_issue_until_pair(&mut res, line_count);
    assign_fallback(&mut res, line_count);
    res
}

/// Value of the maximum score and the first line attaining it.
fn peak(scores: &[u32]) -> (u32, usize) {
    let mut best = (0, 0);
    for (line, &score) in scores.iter().enumerate() {
        if score > best.0 {
            best = (score, line);
        }
    }
    best
}

/// Suppression pass: a line on which exactly one role scores >= 2 is claimed
/// by that role, and the claimed candidate values disappear from every other
/// role's set on that line. Ties between claimants leave the line untouched
/// for the later passes.
fn suppress_claimed_lines(res: &mut Resolution, line_count: usize) {
    for line in 0..line_count {
        let mut claimants = (0..DATE_ROLES.len()).filter(|&r| res.scores[r][line] >= 2);
        let Some(keeper) = claimants.next() else {
            continue;
        };
        if claimants.next().is_some() {
            continue;
        }
        let claimed: Vec<String> = res.candidates[keeper][line]
            .iter()
            .map(CalendarDate::canonical)
            .collect();
        if claimed.is_empty() {
            continue;
        }
        debug!(line, role = %DATE_ROLES[keeper], "line claimed, suppressing competitors");
        for role in 0..DATE_ROLES.len() {
            if role != keeper {
                res.candidates[role][line].retain(|d| !claimed.contains(&d.canonical()));
            }
        }
    }
}

/// ValidUntil's best line doubling as an issue-date line with a thin
/// candidate set is an issue+until pair; ValidFrom is dropped there.
fn drop_crowded_from(res: &mut Resolution) {
    let (best_score, best_line) = peak(&res.scores[UNTIL]);
    if best_score == 0 {
        return;
    }
    if res.scores[ISSUE][best_line] > 0 && res.candidates[UNTIL][best_line].len() < 3 {
        res.scores[FROM][best_line] = 0;
        res.candidates[FROM][best_line].clear();
    }
}

/// A line holding exactly two ValidUntil candidates with a positive
/// ValidFrom score and no IssueDate signal is a from...until range: the
/// earlier candidate starts the validity, the later one ends it.
fn assign_shared_validity_line(res: &mut Resolution, line_count: usize) {
    for line in 0..line_count {
        if res.candidates[UNTIL][line].len() == 2
            && res.scores[FROM][line] > 0
            && res.scores[ISSUE][line] == 0
        {
            let mut from = res.candidates[UNTIL][line][0].clone();
            let mut until = res.candidates[UNTIL][line][1].clone();
            if from.canonical() > until.canonical() {
                std::mem::swap(&mut from, &mut until);
            }
            debug!(line, %from, %until, "validity range on one line");
            res.resolved[FROM] = Some(from);
            res.resolved[UNTIL] = Some(until);
        }
    }
}

/// Iterative threshold assignment: from the highest score down, a role whose
/// unique best line holds exactly one remaining candidate takes it, and the
/// taken value is suppressed from the other roles on that line. Each
/// threshold is re-run until no assignment changes, since one assignment can
/// unlock another.
fn assign_by_threshold(res: &mut Resolution) {
    let max_score = res
        .scores
        .iter()
        .flat_map(|v| v.iter())
        .copied()
        .max()
        .unwrap_or(0);

    for threshold in (1..=max_score).rev() {
        loop {
            let mut changed = false;
            for role in 0..DATE_ROLES.len() {
                if res.resolved[role].is_some() {
                    continue;
                }
                let (best_score, best_line) = peak(&res.scores[role]);
                if best_score < threshold {
                    continue;
                }
                if res.scores[role].iter().filter(|&&s| s == best_score).count() != 1 {
                    continue;
                }
                if res.candidates[role][best_line].len() != 1 {
                    continue;
                }
                let date = res.candidates[role][best_line][0].clone();
                let canon = date.canonical();
                debug!(
                    role = %DATE_ROLES[role],
                    line = best_line,
                    value = %canon,
                    threshold,
                    "assigned"
                );
                res.resolved[role] = Some(date);
                for other in 0..DATE_ROLES.len() {
                    if other != role {
                        res.candidates[other][best_line].retain(|d| d.canonical() != canon);
                    }
                }
                changed = true;
            }
            if !changed {
                break;
            }
        }
    }
}

/// Both validity roles unresolved with coinciding best lines and the same
/// two candidates left: assign the pair in extraction order.
fn assign_coinciding_validity(res: &mut Resolution) {
    if res.resolved[FROM].is_some() || res.resolved[UNTIL].is_some() {
        return;
    }
    let (_, from_line) = peak(&res.scores[FROM]);
    let (_, until_line) = peak(&res.scores[UNTIL]);
    if from_line != until_line {
        return;
    }
    let from_candidates = &res.candidates[FROM][from_line];
    let until_candidates = &res.candidates[UNTIL][until_line];
    if from_candidates.len() == 2 && from_candidates == until_candidates {
        res.resolved[FROM] = Some(from_candidates[0].clone());
        res.resolved[UNTIL] = Some(from_candidates[1].clone());
    }
}

/// Both ValidUntil and IssueDate unresolved: the first issue-scored line
/// with exactly two candidates for each supplies the pair, in chronological
/// order.
fn assign_issue_until_pair(res: &mut Resolution, line_count: usize) {
    if res.resolved[UNTIL].is_some() || res.resolved[ISSUE].is_some() {
        return;
    }
    for line in 0..line_count {
        if res.scores[ISSUE][line] == 0 {
            continue;
        }
        if res.candidates[UNTIL][line].len() == 2 && res.candidates[ISSUE][line].len() == 2 {
            let mut issue = res.candidates[ISSUE][line][0].clone();
            let mut until = res.candidates[ISSUE][line][1].clone();
            if issue.canonical() > until.canonical() {
                std::mem::swap(&mut issue, &mut until);
            }
            res.resolved[ISSUE] = Some(issue);
            res.resolved[UNTIL] = Some(until);
            return;
        }
    }
}

/// Last resort per unresolved role: lines in descending score order (ties in
/// reading order), first line with a remaining candidate wins. Birthday
/// takes the earliest candidate by canonical string, the other roles the
/// first in extraction order.
fn assign_fallback(res: &mut Resolution, line_count: usize) {
    for role in 0..DATE_ROLES.len() {
        if res.resolved[role].is_some() {
            continue;
        }
        let mut order: Vec<usize> = (0..line_count).collect();
        order.sort_by_key(|&line| Reverse(res.scores[role][line]));
        for line in order {
            let remaining = &res.candidates[role][line];
            if remaining.is_empty() {
                continue;
            }
            let date = if role == BIRTHDAY {
                remaining.iter().min().cloned()
            } else {
                remaining.first().cloned()
            };
            if let Some(date) = date {
                debug!(role = %DATE_ROLES[role], line, value = %date, "fallback assignment");
                res.resolved[role] = Some(date);
            }
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::insurance_card_compiled;
    use pretty_assertions::assert_eq;

    fn run(texts: &[&str]) -> FieldMap {
        let table = insurance_card_compiled().unwrap();
        DatesFinder.run(&table, &Page::from_texts(texts))
    }

    #[test]
    fn test_birthday_alone() {
        let map = run(&["生年月日昭和62年3月10日"]);
        assert_eq!(map.get(Field::Birthday), Some("19870310"));
        assert_eq!(map.get(Field::ValidFrom), None);
        assert_eq!(map.get(Field::ValidUntil), None);
        assert_eq!(map.get(Field::IssueDate), None);
    }

    #[test]
    fn test_validity_range_on_one_line() {
        let map = run(&["有効開始日令和元年1月2日有効終了日令和2年1月2日"]);
        assert_eq!(map.get(Field::ValidFrom), Some("20190102"));
        assert_eq!(map.get(Field::ValidUntil), Some("20200102"));
    }

    #[test]
    fn test_issue_date_alone() {
        let map = run(&["令和元年1月1日交付"]);
        assert_eq!(map.get(Field::IssueDate), Some("20190101"));
        assert_eq!(map.get(Field::Birthday), None);
        assert_eq!(map.get(Field::ValidFrom), None);
        assert_eq!(map.get(Field::ValidUntil), None);
    }

    #[test]
    fn test_all_four_roles() {
        let map = run(&[
            "生年月日平成1年2月3日",
            "有効開始日令和元年1月2日有効終了日令和2年1月2日",
            "令和元年1月1日交付",
        ]);
        assert_eq!(map.get(Field::Birthday), Some("19890203"));
        assert_eq!(map.get(Field::ValidFrom), Some("20190102"));
        assert_eq!(map.get(Field::ValidUntil), Some("20200102"));
        assert_eq!(map.get(Field::IssueDate), Some("20190101"));
    }

    #[test]
    fn test_label_split_from_value() {
        // Line segmentation pushed the end date below its label; the
        // extended ValidUntil scoring bridges the gap.
        let map = run(&["有効期限", "令和3年3月31日"]);
        assert_eq!(map.get(Field::ValidUntil), Some("20210331"));
    }

    #[test]
    fn test_empty_page() {
        let map = run(&[]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let texts = [
            "生年月日平成1年2月3日",
            "有効開始日令和元年1月2日有効終了日令和2年1月2日",
            "令和元年1月1日交付",
        ];
        assert_eq!(run(&texts), run(&texts));
    }

    #[test]
    fn test_last_day_sentinel_resolves() {
        let map = run(&["有効期限令和3年2月末日"]);
        assert_eq!(map.get(Field::ValidUntil), Some("20210299"));
    }
}
