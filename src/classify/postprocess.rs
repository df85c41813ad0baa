//! Deduplication, level refinement and page mapping.

use std::collections::HashSet;

use crate::model::{Heading, HeadingLevel};

use super::level::AssignedHeading;

/// Drop repeated headings, keeping the first occurrence in document order.
///
/// A repeat is the same comparison key on the same page. With
/// `across_pages`, the same key at the same level on a later page is also a
/// repeat (running headers, section names echoed in footers).
///
/// Returns the kept headings and the number dropped.
pub fn dedupe(headings: Vec<AssignedHeading>, across_pages: bool) -> (Vec<AssignedHeading>, usize) {
    let mut seen_on_page: HashSet<(String, u32)> = HashSet::new();
    let mut seen_at_level: HashSet<(String, HeadingLevel)> = HashSet::new();
    let before = headings.len();

    let kept: Vec<AssignedHeading> = headings
        .into_iter()
        .filter(|h| {
            let page_key = (h.candidate.normalized.clone(), h.candidate.page);
            let level_key = (h.candidate.normalized.clone(), h.level);
            if seen_on_page.contains(&page_key)
                || (across_pages && seen_at_level.contains(&level_key))
            {
                log::trace!(
                    "Dropping repeated heading {:?} on page {}",
                    h.candidate.text,
                    h.candidate.page
                );
                return false;
            }
            seen_on_page.insert(page_key);
            seen_at_level.insert(level_key);
            true
        })
        .collect();

    let dropped = before - kept.len();
    (kept, dropped)
}

/// Group distinct font sizes into clusters, largest first.
///
/// A size joins the current cluster while it is within `tolerance` of the
/// cluster's largest size. Returns the largest size of each cluster.
pub fn size_clusters(sizes: impl IntoIterator<Item = f32>, tolerance: f32) -> Vec<f32> {
    let mut sizes: Vec<f32> = sizes.into_iter().filter(|s| s.is_finite()).collect();
    sizes.sort_by(|a, b| b.total_cmp(a));

    let mut heads: Vec<f32> = Vec::new();
    for size in sizes {
        match heads.last() {
            Some(head) if head - size <= tolerance => {}
            _ => heads.push(size),
        }
    }
    heads
}

/// Remap every level onto the observed font-size hierarchy.
///
/// The cluster with the largest sizes becomes H1, the next H2, and every
/// smaller cluster H3, whatever level the signals proposed.
pub fn refine_levels(headings: &mut [AssignedHeading], tolerance: f32) {
    let heads = size_clusters(headings.iter().map(|h| h.candidate.font_size), tolerance);

    for heading in headings.iter_mut() {
        let size = heading.candidate.font_size;
        // Clusters are descending; a size belongs to the last head at or above it.
        let rank = heads
            .iter()
            .rposition(|head| *head >= size)
            .unwrap_or(0);
        let level = HeadingLevel::from_rank(rank);
        if level != heading.level {
            log::trace!(
                "Refined {:?} from {} to {}",
                heading.candidate.text,
                heading.level,
                level
            );
            heading.level = level;
        }
    }
}

/// Final headings with 1-based page numbers.
pub fn to_headings(headings: Vec<AssignedHeading>) -> Vec<Heading> {
    headings
        .into_iter()
        .map(|h| Heading::new(h.level, h.candidate.text, h.candidate.page + 1))
        .collect()
}
