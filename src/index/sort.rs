//! TOC ordering by document position.
//!
//! Some books ship their TOC out of reading order (appendix-first front
//! matter, generated navs). The sorter reorders the top-level entries by
//! `location.current` so the binary search's ordering precondition holds.

use std::cmp::Ordering;

use super::{TocId, TocNode};

/// Stable sort of the top-level entry ordering by starting location.
///
/// Entries without a location compare equal to everything, so stability
/// keeps them where they are. Nested sub-item orderings are never touched.
pub(crate) fn sort_toc(roots: &mut [TocId], nodes: &[TocNode]) {
    roots.sort_by(|&a, &b| {
        match (nodes[a.index()].location, nodes[b.index()].location) {
            (Some(x), Some(y)) => x.current.cmp(&y.current),
            _ => Ordering::Equal,
        }
    });
}
