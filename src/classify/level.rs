//! Level assignment from combined signals.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::model::HeadingLevel;

use super::candidate::{HeadingCandidate, Signals};
use super::typography::CutPoints;

/// Which signal fixed a heading's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelSource {
    Pattern,
    Keyword,
    Typography,
}

/// A candidate accepted as a heading.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedHeading {
    pub candidate: HeadingCandidate,
    pub level: HeadingLevel,
    pub source: LevelSource,
}

/// Resolve a candidate's level from its signals.
///
/// A pattern match wins outright, then a keyword match. Otherwise the
/// typography score must reach `min_score`, and the percentile is bucketed
/// by `cuts`. `None` means the candidate is not a heading.
pub fn resolve_level(
    signals: &Signals,
    percentile: f32,
    cuts: &CutPoints,
    min_score: f32,
) -> Option<(HeadingLevel, LevelSource)> {
    if let Some(level) = signals.pattern_level {
        return Some((level, LevelSource::Pattern));
    }
    if let Some(level) = signals.keyword_level {
        return Some((level, LevelSource::Keyword));
    }
    if signals.typography_score < min_score {
        return None;
    }

    let level = if percentile >= cuts.h1 {
        HeadingLevel::H1
    } else if percentile >= cuts.h2 {
        HeadingLevel::H2
    } else {
        HeadingLevel::H3
    };
    Some((level, LevelSource::Typography))
}

/// Turns scored candidates into headings.
#[derive(Debug, Clone, Copy)]
pub struct LevelAssigner {
    cuts: CutPoints,
    min_score: f32,
    max_typography_per_page: usize,
}

impl LevelAssigner {
    pub fn new(cuts: CutPoints, min_score: f32, max_typography_per_page: usize) -> Self {
        Self {
            cuts,
            min_score,
            max_typography_per_page,
        }
    }

    /// Assign levels, dropping candidates with no usable signal.
    ///
    /// Typography-only headings on one page are capped; the survivors are
    /// those with the highest score, then the highest percentile, then the
    /// earliest position. The result keeps document order.
    pub fn assign(&self, candidates: Vec<HeadingCandidate>) -> Vec<AssignedHeading> {
        let mut assigned: Vec<AssignedHeading> = candidates
            .into_iter()
            .filter_map(|candidate| {
                match resolve_level(
                    &candidate.signals,
                    candidate.percentile,
                    &self.cuts,
                    self.min_score,
                ) {
                    Some((level, source)) => Some(AssignedHeading {
                        candidate,
                        level,
                        source,
                    }),
                    None => {
                        log::trace!(
                            "Rejected {:?} (score {:.3})",
                            candidate.text,
                            candidate.signals.typography_score
                        );
                        None
                    }
                }
            })
            .collect();

        if self.max_typography_per_page > 0 {
            let dropped = self.over_cap(&assigned);
            if !dropped.is_empty() {
                log::debug!("Dropping {} typography headings over the page cap", dropped.len());
                assigned.retain(|h| !dropped.contains(&h.candidate.order));
            }
        }

        assigned.sort_by_key(|h| h.candidate.order);
        assigned
    }

    /// Orders of typography headings beyond the per-page cap.
    fn over_cap(&self, assigned: &[AssignedHeading]) -> HashSet<usize> {
        let mut by_page: BTreeMap<u32, Vec<&AssignedHeading>> = BTreeMap::new();
        for heading in assigned.iter().filter(|h| h.source == LevelSource::Typography) {
            by_page.entry(heading.candidate.page).or_default().push(heading);
        }

        let mut dropped = HashSet::new();
        for (_, mut headings) in by_page {
            if headings.len() <= self.max_typography_per_page {
                continue;
            }
            headings.sort_by(|a, b| typography_rank(&a.candidate, &b.candidate));
            dropped.extend(
                headings[self.max_typography_per_page..]
                    .iter()
                    .map(|h| h.candidate.order),
            );
        }
        dropped
    }
}

/// Score descending, then percentile descending, then document order.
fn typography_rank(a: &HeadingCandidate, b: &HeadingCandidate) -> Ordering {
    b.signals
        .typography_score
        .total_cmp(&a.signals.typography_score)
        .then_with(|| b.percentile.total_cmp(&a.percentile))
        .then_with(|| a.order.cmp(&b.order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::candidate::Position;
    use HeadingLevel::{H1, H2, H3};

    fn cuts() -> CutPoints {
        CutPoints { h1: 0.9, h2: 0.7 }
    }

    fn signals(pattern: Option<HeadingLevel>, keyword: Option<HeadingLevel>, score: f32) -> Signals {
        Signals {
            pattern_level: pattern,
            keyword_level: keyword,
            typography_score: score,
        }
    }

    fn candidate(order: usize, page: u32, score: f32, percentile: f32) -> HeadingCandidate {
        HeadingCandidate {
            text: format!("Heading {}", order),
            normalized: format!("heading {}", order),
            page,
            font_size: 14.0,
            bold: true,
            all_caps: false,
            standalone: true,
            word_count: 2,
            position: Position { page, y: order as f32 * 20.0, x: 72.0 },
            order,
            percentile,
            signals: signals(None, None, score),
        }
    }

    #[test]
    fn test_pattern_overrides_everything() {
        let s = signals(Some(H1), Some(H3), 0.0);
        assert_eq!(resolve_level(&s, 0.05, &cuts(), 0.3), Some((H1, LevelSource::Pattern)));
    }

    #[test]
    fn test_keyword_before_typography() {
        let s = signals(None, Some(H2), 0.95);
        assert_eq!(resolve_level(&s, 0.99, &cuts(), 0.3), Some((H2, LevelSource::Keyword)));
    }

    #[test]
    fn test_typography_buckets() {
        let s = signals(None, None, 0.6);
        let resolve = |p| resolve_level(&s, p, &cuts(), 0.3).map(|(l, _)| l);
        assert_eq!(resolve(0.95), Some(H1));
        assert_eq!(resolve(0.9), Some(H1));
        assert_eq!(resolve(0.75), Some(H2));
        assert_eq!(resolve(0.2), Some(H3));

        let weak = signals(None, None, 0.29);
        assert_eq!(resolve_level(&weak, 0.99, &cuts(), 0.3), None);
    }

    #[test]
    fn test_no_cut_points_yields_h3() {
        let s = signals(None, None, 0.8);
        assert_eq!(
            resolve_level(&s, 1.0, &CutPoints::none(), 0.3),
            Some((H3, LevelSource::Typography))
        );
    }

    #[test]
    fn test_assign_drops_unsignaled_and_keeps_order() {
        let mut numbered = candidate(1, 0, 0.0, 0.1);
        numbered.signals.pattern_level = Some(H1);
        let candidates = vec![
            candidate(0, 0, 0.1, 0.5),
            numbered,
            candidate(2, 0, 0.7, 0.95),
        ];

        let assigned = LevelAssigner::new(cuts(), 0.3, 12).assign(candidates);
        let summary: Vec<_> = assigned.iter().map(|h| (h.candidate.order, h.level)).collect();
        assert_eq!(summary, vec![(1, H1), (2, H1)]);
    }

    #[test]
    fn test_per_page_cap_tie_breaks() {
        let candidates = vec![
            candidate(0, 0, 0.5, 0.5),
            candidate(1, 0, 0.8, 0.5),
            candidate(2, 0, 0.5, 0.8),
            candidate(3, 0, 0.5, 0.5),
            candidate(4, 1, 0.4, 0.5),
        ];

        let assigned = LevelAssigner::new(cuts(), 0.3, 3).assign(candidates);
        let orders: Vec<_> = assigned.iter().map(|h| h.candidate.order).collect();
        // Page 0 keeps the best score, the higher percentile, then the earlier line
        assert_eq!(orders, vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_cap_ignores_pattern_headings() {
        let mut candidates: Vec<_> = (0..4).map(|i| candidate(i, 0, 0.0, 0.1)).collect();
        for c in &mut candidates {
            c.signals.pattern_level = Some(H2);
        }
        let assigned = LevelAssigner::new(cuts(), 0.3, 1).assign(candidates);
        assert_eq!(assigned.len(), 4);
    }
}
