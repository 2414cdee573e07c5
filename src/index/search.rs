//! CFI binary search over bound TOC entries.
//!
//! Entries must be ordered by document position (see the sorter); the
//! search finds the entry containing a target CFI: an exact match, or the
//! rightmost entry starting before the target, refined through sub-items
//! either way.

use std::cmp::Ordering;

use super::{MAX_DEPTH, TocId, TocNode};
use crate::cfi::Cfi;

/// Find the TOC entry containing `target` among `entries`.
///
/// Returns `None` when the list is empty or the target precedes every
/// entry. Entries without a CFI can never match: at such a gap the probe
/// slides right to the nearest decidable entry, and a fully undecidable
/// right half falls back to the left one.
pub(crate) fn find_in(
    nodes: &[TocNode],
    entries: &[TocId],
    target: &Cfi,
    depth: usize,
) -> Option<TocId> {
    if depth >= MAX_DEPTH {
        return None;
    }

    let mut lo = 0;
    let mut hi = entries.len();
    let mut best: Option<TocId> = None;

    while lo < hi {
        let mid = lo + (hi - lo) / 2;

        let mut probe = mid;
        while probe < hi && nodes[entries[probe].index()].cfi.is_none() {
            probe += 1;
        }
        if probe == hi {
            hi = mid;
            continue;
        }

        let node = &nodes[entries[probe].index()];
        // Probe holds a CFI by construction.
        let Some(cfi) = &node.cfi else { break };
        match cfi.compare(target) {
            Ordering::Equal => {
                let refined = find_in(nodes, &node.subitems, target, depth + 1);
                return Some(refined.unwrap_or(entries[probe]));
            }
            Ordering::Less => {
                best = Some(entries[probe]);
                lo = probe + 1;
            }
            // Everything from mid up is either a gap or past the target.
            Ordering::Greater => hi = mid,
        }
    }

    let found = best?;
    let refined = find_in(nodes, &nodes[found.index()].subitems, target, depth + 1);
    Some(refined.unwrap_or(found))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: usize, cfi: Option<&str>) -> TocNode {
        TocNode {
            id,
            label: format!("entry {id}"),
            href: None,
            cfi: cfi.map(|s| Cfi::parse(s).unwrap()),
            location: None,
            subitems: Vec::new(),
        }
    }

    fn arena(cfis: &[Option<&str>]) -> (Vec<TocNode>, Vec<TocId>) {
        let nodes: Vec<TocNode> = cfis
            .iter()
            .enumerate()
            .map(|(i, cfi)| entry(i, *cfi))
            .collect();
        let roots = (0..nodes.len() as u32).map(TocId).collect();
        (nodes, roots)
    }

    fn find(nodes: &[TocNode], roots: &[TocId], target: &str) -> Option<usize> {
        let target = Cfi::parse(target).unwrap();
        find_in(nodes, roots, &target, 0).map(|id| nodes[id.index()].id)
    }

    #[test]
    fn test_between_entries_returns_predecessor() {
        let (nodes, roots) = arena(&[Some("/6/2"), Some("/6/8"), Some("/6/14")]);
        assert_eq!(find(&nodes, &roots, "/6/10"), Some(1));
        assert_eq!(find(&nodes, &roots, "/6/4"), Some(0));
        assert_eq!(find(&nodes, &roots, "/6/20"), Some(2));
    }

    #[test]
    fn test_exact_match_returns_entry() {
        let (nodes, roots) = arena(&[Some("/6/2"), Some("/6/8"), Some("/6/14")]);
        assert_eq!(find(&nodes, &roots, "/6/2"), Some(0));
        assert_eq!(find(&nodes, &roots, "/6/8"), Some(1));
        assert_eq!(find(&nodes, &roots, "/6/14"), Some(2));
    }

    #[test]
    fn test_before_first_entry_returns_none() {
        let (nodes, roots) = arena(&[Some("/6/2"), Some("/6/8"), Some("/6/14")]);
        assert_eq!(find(&nodes, &roots, "/6/1"), None);
    }

    #[test]
    fn test_empty_list_returns_none() {
        let (nodes, roots) = arena(&[]);
        assert_eq!(find(&nodes, &roots, "/6/2"), None);
    }

    #[test]
    fn test_predecessor_refines_into_subitems() {
        // Chapter at /6/4 with named points at /6/4!/4/2 and /6/4!/4/10.
        let mut nodes = vec![
            entry(0, Some("/6/2")),
            entry(1, Some("/6/4")),
            entry(2, Some("/6/4!/4/2")),
            entry(3, Some("/6/4!/4/10")),
        ];
        nodes[1].subitems = vec![TocId(2), TocId(3)];
        let roots = vec![TocId(0), TocId(1)];

        // Inside the second sub-item.
        assert_eq!(find(&nodes, &roots, "/6/4!/4/12"), Some(3));
        // Before the first sub-item: the chapter itself wins.
        assert_eq!(find(&nodes, &roots, "/6/4!/2"), Some(1));
        // Exact match on the chapter stands when no sub-item contains the
        // target.
        assert_eq!(find(&nodes, &roots, "/6/4"), Some(1));
    }

    #[test]
    fn test_exact_match_refines_into_matching_subitem() {
        let mut nodes = vec![
            entry(0, Some("/6/4")),
            entry(1, Some("/6/4")),
            entry(2, Some("/6/4!/4/10")),
        ];
        nodes[0].subitems = vec![TocId(1), TocId(2)];
        let roots = vec![TocId(0)];

        // The first sub-item matches the target exactly, so the refined
        // result replaces the parent.
        assert_eq!(find(&nodes, &roots, "/6/4"), Some(1));
    }

    #[test]
    fn test_entries_without_cfi_never_match() {
        let (nodes, roots) = arena(&[None, None, None]);
        assert_eq!(find(&nodes, &roots, "/6/2"), None);

        let (nodes, roots) = arena(&[Some("/6/2"), None, Some("/6/8")]);
        // Probe past the gap in both directions.
        assert_eq!(find(&nodes, &roots, "/6/8"), Some(2));
        assert_eq!(find(&nodes, &roots, "/6/4"), Some(0));
    }
}
