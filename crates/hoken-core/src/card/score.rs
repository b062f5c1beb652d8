//! Line relevance scoring.

use crate::models::Page;

use super::matchers::RoleMatcher;

/// Per-line scores and located sub-texts for one role over one page.
#[derive(Debug, Clone)]
pub struct ScoredLines {
    /// One score per line; 0 = irrelevant.
    pub scores: Vec<u32>,
    /// The matcher-located sub-text per line, used for extraction.
    pub texts: Vec<String>,
}

/// Score every line of a page against a role matcher.
///
/// Raw hits are 0/1 per line. With `extend`, a hit propagates to its
/// neighbors: a directly hit line scores 2, its unhit neighbors 1, a hit
/// line adjacent to another hit 3. Extension catches values pushed onto the
/// next line by line segmentation.
pub fn score_lines(matcher: &RoleMatcher<'_>, page: &Page, extend: bool) -> ScoredLines {
    let results: Vec<_> = page.texts().map(|t| matcher.matches(t)).collect();
    let hits: Vec<u32> = results.iter().map(|r| r.matched as u32).collect();
    let texts = results.into_iter().map(|r| r.text).collect();
    let scores = if extend { extend_hits(&hits) } else { hits };
    ScoredLines { scores, texts }
}

/// Neighbor extension: `score[i] = 2*hit[i] + hit[i-1] + hit[i+1]`,
/// out-of-range neighbors contributing 0.
pub fn extend_hits(hits: &[u32]) -> Vec<u32> {
    let n = hits.len();
    (0..n)
        .map(|i| {
            let above = if i > 0 { hits[i - 1] } else { 0 };
            let below = if i + 1 < n { hits[i + 1] } else { 0 };
            2 * hits[i] + above + below
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::insurance_card_compiled;
    use crate::rules::Role;

    #[test]
    fn test_extend_hits_arithmetic() {
        assert_eq!(extend_hits(&[0, 1, 0, 0]), vec![1, 2, 1, 0]);
        assert_eq!(extend_hits(&[1, 1, 0]), vec![3, 3, 1]);
        assert_eq!(extend_hits(&[1]), vec![2]);
        assert_eq!(extend_hits(&[]), Vec::<u32>::new());
    }

    #[test]
    fn test_score_lines_matches_page_length() {
        let table = insurance_card_compiled().unwrap();
        let page = Page::from_texts(&["無関係な行", "生年月日昭和62年3月10日", "別の行"]);
        let matcher = table.matcher(Role::Birthday);

        let raw = score_lines(&matcher, &page, false);
        assert_eq!(raw.scores, vec![0, 1, 0]);
        assert_eq!(raw.texts.len(), page.len());

        let extended = score_lines(&matcher, &page, true);
        assert_eq!(extended.scores, vec![1, 2, 1]);
    }
}
