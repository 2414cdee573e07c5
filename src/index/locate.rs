//! Size accumulation and location assignment.
//!
//! Locations are the book-wide reading coordinate: every
//! `size_per_location` bytes of linear content is one location. The
//! accumulator turns section sizes into prefix sums, the assigner divides
//! those sums into `{current, next, total}` triples for every section and
//! sub-item. Sizes come straight from the manifest, so all size arithmetic
//! saturates at `usize::MAX` instead of overflowing.

use super::{Location, MAX_DEPTH, SectionId, SectionNode};

/// A section's contribution to the location scale: its size, unless the
/// section is non-linear (or sizeless), which contributes nothing.
pub(crate) fn effective_size(node: &SectionNode) -> usize {
    if node.linear.counts() && node.size > 0 {
        node.size
    } else {
        0
    }
}

/// Prefix sums of effective sizes, one per top-level section.
///
/// `sums[i]` covers the effective sizes strictly before section `i`, so
/// `sums[0]` is always 0 and the sequence is monotonically non-decreasing.
pub(crate) fn accumulate_sizes(nodes: &[SectionNode], roots: &[SectionId]) -> Vec<usize> {
    let mut sums = Vec::with_capacity(roots.len());
    let mut running = 0usize;
    for &root in roots {
        sums.push(running);
        running = running.saturating_add(effective_size(&nodes[root.index()]));
    }
    sums
}

/// Total effective size of the book: the last prefix sum plus the last
/// section's effective size. 0 when there are no sections.
pub(crate) fn total_effective_size(
    nodes: &[SectionNode],
    roots: &[SectionId],
    sums: &[usize],
) -> usize {
    match (roots.last(), sums.last()) {
        (Some(&last), Some(&sum)) => sum.saturating_add(effective_size(&nodes[last.index()])),
        _ => 0,
    }
}

/// Assign `{current, next, total}` location triples to every section and
/// sub-item, and return the book's total location count.
///
/// Section `i` spans `sums[i]/unit .. (sums[i]+effective)/unit`; non-linear
/// sections still get a (zero-width) triple so they remain addressable.
/// Empty books and a zero unit assign nothing and total 0.
pub(crate) fn assign_locations(
    nodes: &mut [SectionNode],
    roots: &[SectionId],
    sums: &[usize],
    unit: usize,
) -> usize {
    let total_size = total_effective_size(nodes, roots, sums);
    if total_size == 0 || unit == 0 {
        return 0;
    }
    let total = total_size / unit;

    for (i, &root) in roots.iter().enumerate() {
        let base = sums[i];
        let size = effective_size(&nodes[root.index()]);
        let current = base / unit;
        let next = base.saturating_add(size) / unit;
        nodes[root.index()].location = Some(Location {
            current,
            next,
            total,
        });
        assign_subitem_locations(nodes, root, base, next, unit, total, 0);
    }

    total
}

/// Subdivide a section's byte range across its sub-items.
///
/// A running byte offset starts at the parent's prefix-sum base; each
/// sub-item's `current` is the offset's location, its `next` the location
/// after its own size, and the last sub-item inherits the parent's `next`
/// so the children tile the parent exactly.
fn assign_subitem_locations(
    nodes: &mut [SectionNode],
    parent: SectionId,
    base: usize,
    parent_next: usize,
    unit: usize,
    total: usize,
    depth: usize,
) {
    if depth >= MAX_DEPTH {
        return;
    }
    let kids = nodes[parent.index()].subitems.clone();
    let mut offset = base;
    for (j, &kid) in kids.iter().enumerate() {
        let size = nodes[kid.index()].size;
        let next = if j + 1 == kids.len() {
            parent_next
        } else {
            offset.saturating_add(size) / unit
        };
        nodes[kid.index()].location = Some(Location {
            current: offset / unit,
            next,
            total,
        });
        assign_subitem_locations(nodes, kid, offset, next, unit, total, depth + 1);
        offset = offset.saturating_add(size);
    }
}
