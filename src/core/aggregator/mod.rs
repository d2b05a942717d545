//! # Aggregator Module
//!
//! Collects the results that cleared the threshold during one session and
//! ranks them when the session completes.
//!
//! Results arrive in completion order, which is nondeterministic. Each one
//! carries its discovery index so the final ranking can break score ties
//! by the order the enumerator found the files.

use crate::core::enumerator::ImagePath;
use crate::core::scorer::FocusScore;
use serde::{Deserialize, Serialize};

/// One scored file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub path: ImagePath,
    pub score: FocusScore,
}

/// Accumulates results for a single session.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    entries: Vec<(usize, ScanResult)>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Record a result. `discovery_index` is the file's position in the
    /// enumeration.
    pub fn push(&mut self, discovery_index: usize, result: ScanResult) {
        self.entries.push((discovery_index, result));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank by score, best first; equal scores keep discovery order.
    pub fn finish(mut self) -> RankedResultSet {
        self.entries.sort_by(|(a_index, a), (b_index, b)| {
            b.score
                .value()
                .total_cmp(&a.score.value())
                .then(a_index.cmp(b_index))
        });

        RankedResultSet {
            results: self.entries.into_iter().map(|(_, result)| result).collect(),
        }
    }

    /// Throw away a cancelled session's partial results.
    pub fn discard(self) {
        tracing::debug!(partial = self.entries.len(), "Discarding partial results");
    }
}

/// The ranked output of a completed scan, sharpest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedResultSet {
    results: Vec<ScanResult>,
}

impl RankedResultSet {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScanResult> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[ScanResult] {
        &self.results
    }
}

impl<'a> IntoIterator for &'a RankedResultSet {
    type Item = &'a ScanResult;
    type IntoIter = std::slice::Iter<'a, ScanResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, score: f64) -> ScanResult {
        ScanResult {
            path: ImagePath::new(format!("/photos/{}", name)),
            score: FocusScore::new(score),
        }
    }

    fn names(set: &RankedResultSet) -> Vec<String> {
        set.iter().map(|r| r.path.file_name()).collect()
    }

    #[test]
    fn ranks_by_score_descending() {
        let mut aggregator = ResultAggregator::new();
        aggregator.push(0, result("blurry.jpg", 12.0));
        aggregator.push(1, result("sharp.jpg", 900.0));
        aggregator.push(2, result("ok.jpg", 250.0));

        let ranked = aggregator.finish();

        assert_eq!(names(&ranked), vec!["sharp.jpg", "ok.jpg", "blurry.jpg"]);
    }

    #[test]
    fn ties_keep_discovery_order_regardless_of_arrival() {
        let mut aggregator = ResultAggregator::new();
        // Arrival order differs from discovery order
        aggregator.push(3, result("d.jpg", 100.0));
        aggregator.push(0, result("a.jpg", 100.0));
        aggregator.push(2, result("c.jpg", 500.0));
        aggregator.push(1, result("b.jpg", 100.0));

        let ranked = aggregator.finish();

        assert_eq!(names(&ranked), vec!["c.jpg", "a.jpg", "b.jpg", "d.jpg"]);
    }

    #[test]
    fn empty_aggregator_yields_empty_set() {
        let ranked = ResultAggregator::new().finish();
        assert!(ranked.is_empty());
    }

    #[test]
    fn ranked_set_serializes_as_list() {
        let mut aggregator = ResultAggregator::new();
        aggregator.push(0, result("a.jpg", 2.5));

        let json = serde_json::to_string(&aggregator.finish()).unwrap();

        assert_eq!(json, r#"[{"path":"/photos/a.jpg","score":2.5}]"#);
    }
}
