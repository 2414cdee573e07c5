//! Section lookup map: the binder's resolution table.
//!
//! One flat map covers both addressing styles TOC hrefs use: top-level
//! sections are keyed by their `id`, nested sub-items (at any depth) by
//! their `href`. Values are arena indices into the section arena.

use std::collections::HashMap;

use super::{MAX_DEPTH, SectionId, SectionNode};

/// Build the lookup map for one section arena.
///
/// Later insertions win on key collision, so a sub-item href can shadow an
/// identically named top-level id.
pub(crate) fn build_section_lookup(
    nodes: &[SectionNode],
    roots: &[SectionId],
) -> HashMap<String, SectionId> {
    let mut lookup = HashMap::new();
    for &root in roots {
        lookup.insert(nodes[root.index()].id.clone(), root);
        insert_subitem_hrefs(nodes, root, &mut lookup, 0);
    }
    lookup
}

fn insert_subitem_hrefs(
    nodes: &[SectionNode],
    parent: SectionId,
    lookup: &mut HashMap<String, SectionId>,
    depth: usize,
) {
    if depth >= MAX_DEPTH {
        return;
    }
    for &kid in &nodes[parent.index()].subitems {
        let href = &nodes[kid.index()].href;
        if !href.is_empty() {
            lookup.insert(href.clone(), kid);
        }
        insert_subitem_hrefs(nodes, kid, lookup, depth + 1);
    }
}
