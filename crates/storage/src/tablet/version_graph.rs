//! Version graphs over rowset intervals.
//!
//! A rowset covering `[start, end]` is an edge from node `start` to node
//! `end + 1`. A readable tablet keeps `[0, V]` spannable: every version up
//! to the tablet's max must be reachable from node 0 through published
//! rowsets. Snapshot selection asks for the *shortest* such path — the
//! fewest rowsets whose intervals partition the requested range —
//! preferring the wider (newer, compacted) edge on ties.

use std::collections::{HashMap, VecDeque};

use tessera_core::{Result, TesseraError, Version};

use crate::rowset::meta::RowsetMeta;

/// Edge set of a tablet's version graph.
#[derive(Debug, Default)]
pub struct VersionGraph {
    /// Outgoing intervals keyed by their start node, widest first.
    edges: HashMap<i64, Vec<Version>>,
}

impl VersionGraph {
    /// Build a graph from the visible rowset metas of a header.
    pub fn from_metas<'a>(metas: impl IntoIterator<Item = &'a RowsetMeta>) -> Self {
        let mut edges: HashMap<i64, Vec<Version>> = HashMap::new();
        for meta in metas {
            edges.entry(meta.version.start).or_default().push(meta.version);
        }
        for intervals in edges.values_mut() {
            intervals.sort_by_key(|v| std::cmp::Reverse(v.end));
            intervals.dedup();
        }
        VersionGraph { edges }
    }

    /// Shortest sequence of version intervals partitioning `range`.
    ///
    /// Breadth-first search from `range.start` to `range.end + 1`
    /// minimises the rowset count; neighbours are visited widest-end
    /// first, so on equal hop counts the wider interval wins.
    pub fn capture_consistent_versions(&self, range: Version) -> Result<Vec<Version>> {
        let target = range.end + 1;
        if range.start >= target {
            return Err(TesseraError::SelectionFailed { range });
        }

        let mut parent: HashMap<i64, Version> = HashMap::new();
        let mut queue = VecDeque::from([range.start]);
        while let Some(node) = queue.pop_front() {
            if node == target {
                break;
            }
            let Some(intervals) = self.edges.get(&node) else {
                continue;
            };
            for interval in intervals {
                let next = interval.end + 1;
                if next > target || parent.contains_key(&next) {
                    continue;
                }
                parent.insert(next, *interval);
                queue.push_back(next);
            }
        }

        if !parent.contains_key(&target) {
            return Err(TesseraError::SelectionFailed { range });
        }

        let mut path = Vec::new();
        let mut node = target;
        while node != range.start {
            let interval = parent[&node];
            path.push(interval);
            node = interval.start;
        }
        path.reverse();
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{RowsetId, RowsetState, RowsetType};

    fn meta(start: i64, end: i64) -> RowsetMeta {
        RowsetMeta {
            rowset_id: RowsetId::new(1, (start * 100 + end) as u64),
            tablet_id: 10,
            partition_id: 1,
            tablet_schema_hash: 42,
            rowset_type: RowsetType::Modern,
            state: RowsetState::Visible,
            version: Version::new(start, end),
            version_hash: 0,
            num_rows: 1,
            num_segments: 1,
            empty: false,
            segments_overlap: false,
            creation_time: 0,
        }
    }

    #[test]
    fn test_spans_contiguous_chain() {
        let metas = [meta(0, 0), meta(1, 3), meta(4, 4)];
        let graph = VersionGraph::from_metas(&metas);
        let path = graph.capture_consistent_versions(Version::new(0, 4)).unwrap();
        assert_eq!(
            path,
            vec![Version::new(0, 0), Version::new(1, 3), Version::new(4, 4)]
        );
    }

    #[test]
    fn test_prefers_fewest_rowsets() {
        // Both [0,0]+[1,3] and the compacted [0,3] span [0,3].
        let metas = [meta(0, 0), meta(1, 3), meta(0, 3)];
        let graph = VersionGraph::from_metas(&metas);
        let path = graph.capture_consistent_versions(Version::new(0, 3)).unwrap();
        assert_eq!(path, vec![Version::new(0, 3)]);
    }

    #[test]
    fn test_tie_break_prefers_wider_edge() {
        // Two 2-hop paths exist: [0,1]+[2,4] and [0,2]+[3,4]. The wider
        // first edge ([0,2]) must win the tie.
        let metas = [meta(0, 1), meta(2, 4), meta(0, 2), meta(3, 4)];
        let graph = VersionGraph::from_metas(&metas);
        let path = graph.capture_consistent_versions(Version::new(0, 4)).unwrap();
        assert_eq!(path, vec![Version::new(0, 2), Version::new(3, 4)]);
    }

    #[test]
    fn test_gap_fails_selection() {
        let metas = [meta(0, 0), meta(2, 4)];
        let graph = VersionGraph::from_metas(&metas);
        let err = graph.capture_consistent_versions(Version::new(0, 4)).unwrap_err();
        assert!(matches!(err, TesseraError::SelectionFailed { .. }));
    }

    #[test]
    fn test_partial_range() {
        let metas = [meta(0, 0), meta(1, 3), meta(4, 4)];
        let graph = VersionGraph::from_metas(&metas);
        let path = graph.capture_consistent_versions(Version::new(0, 3)).unwrap();
        assert_eq!(path, vec![Version::new(0, 0), Version::new(1, 3)]);
    }

    #[test]
    fn test_range_beyond_graph_fails() {
        let metas = [meta(0, 0)];
        let graph = VersionGraph::from_metas(&metas);
        assert!(graph.capture_consistent_versions(Version::new(0, 5)).is_err());
    }
}
