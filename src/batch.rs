//! Batch extraction over many documents.
//!
//! Documents are independent: they share only the immutable
//! [`OutlineExtractor`]. A failed document yields its fallback outline and
//! the rest of the batch continues.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pipeline::{ExtractionStats, OutlineExtractor, OutlineResult};
use crate::provider::SpanProvider;

/// Extract every document, returning results in input order.
///
/// Runs on the rayon pool unless the extractor's options are sequential.
pub fn extract_batch<P>(providers: &[P], extractor: &OutlineExtractor) -> Vec<OutlineResult>
where
    P: SpanProvider + Sync,
{
    log::debug!("Extracting batch of {} documents", providers.len());

    if extractor.options().parallel {
        providers.par_iter().map(|p| extractor.extract(p)).collect()
    } else {
        providers.iter().map(|p| extractor.extract(p)).collect()
    }
}

/// Extract every JSON span dump in `paths`, returning results in input order.
///
/// `on_done` is called as each document finishes, from whichever worker
/// thread ran it. Unreadable files yield fallback outlines named after the
/// file stem.
pub fn extract_files<P, F>(paths: &[P], extractor: &OutlineExtractor, on_done: F) -> Vec<OutlineResult>
where
    P: AsRef<Path> + Sync,
    F: Fn(&Path, &OutlineResult) + Sync,
{
    let run = |path: &P| {
        let result = extractor.extract_file(path);
        on_done(path.as_ref(), &result);
        result
    };

    if extractor.options().parallel {
        paths.par_iter().map(run).collect()
    } else {
        paths.iter().map(run).collect()
    }
}

/// A finished document from [`spawn_batch`].
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Position of the document in the input
    pub index: usize,
    /// Extraction result
    pub result: OutlineResult,
}

/// Extract documents in the background, yielding results as they finish.
///
/// Results arrive in completion order; use [`BatchItem::index`] to map
/// them back to inputs. The channel holds at most `capacity` unread items.
/// The receiver disconnects once every document has been sent.
pub fn spawn_batch<P>(
    providers: Vec<P>,
    extractor: Arc<OutlineExtractor>,
    capacity: usize,
) -> Receiver<BatchItem>
where
    P: SpanProvider + Send + 'static,
{
    let (tx, rx) = bounded(capacity.max(1));

    thread::spawn(move || {
        let parallel = extractor.options().parallel;
        let run = |tx: &mut crossbeam_channel::Sender<BatchItem>, (index, provider): (usize, P)| {
            let result = extractor.extract(&provider);
            // Receiver dropped: nobody is listening anymore
            let _ = tx.send(BatchItem { index, result });
        };

        if parallel {
            providers
                .into_par_iter()
                .enumerate()
                .for_each_with(tx, |tx, item| run(tx, item));
        } else {
            let mut tx = tx;
            for item in providers.into_iter().enumerate() {
                run(&mut tx, item);
            }
        }
    });

    rx
}

/// Aggregate outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Documents processed
    pub total: usize,
    /// Documents that produced an outline
    pub succeeded: usize,
    /// Documents that fell back to the identifier-only outline
    pub failed: usize,
    /// Statistics summed over all documents
    pub stats: ExtractionStats,
}

impl BatchSummary {
    /// Summarize a set of results.
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a OutlineResult>,
    {
        let mut summary = Self::default();
        for result in results {
            summary.add(result);
        }
        summary
    }

    /// Add one result to the summary.
    pub fn add(&mut self, result: &OutlineResult) {
        self.total += 1;
        if result.is_failed() {
            self.failed += 1;
        } else {
            self.succeeded += 1;
        }
        self.stats.merge(&result.stats);
    }
}
