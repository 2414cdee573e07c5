//! TOC binding: resolving table-of-contents entries against sections.
//!
//! A pre-order walk gives every TOC item a stable id from an explicit
//! counter, resolves its href through the section lookup map, and copies
//! the resolved section's CFI (always) and location (when the trust rule
//! says the section's coordinates describe the item).

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use super::{MAX_DEPTH, SectionId, SectionNode, TocId, TocNode};
use crate::model::TocItem;

/// Split an href at the first `#` into its primary part and fragment.
///
/// No decoding happens here; both halves are byte-for-byte slices of the
/// input.
pub(crate) fn split_href(href: &str) -> (&str, Option<&str>) {
    match href.find('#') {
        Some(pos) => (&href[..pos], Some(&href[pos + 1..])),
        None => (href, None),
    }
}

/// The trust rule: should a resolved section's location be copied onto a
/// TOC item?
///
/// The section's coordinates describe the item when any of these holds:
/// (a) the href has no fragment, so it addresses the section itself;
/// (b) the TOC is no finer-grained than the section list;
/// (c) the item's href is exactly the section's href;
/// (d) the item's href is exactly the section's id.
/// Otherwise the item points somewhere inside a section whose start
/// location would be misleading.
pub(crate) fn section_location_applies(
    href: &str,
    primary: &str,
    section: &SectionNode,
    toc_count: usize,
    section_count: usize,
) -> bool {
    primary == href
        || toc_count <= section_count
        || href == section.href
        || href == section.id
}

/// Bind a TOC tree into the arena, returning the root ordering.
///
/// `next_id` is the id counter: read for items without a pre-assigned id,
/// advanced for every visited item either way, and left holding the next
/// unused value. `section_count` is the number of top-level sections;
/// `transform` is applied to every label.
pub(crate) fn bind_toc(
    items: &[TocItem],
    sections: &[SectionNode],
    section_count: usize,
    lookup: &HashMap<String, SectionId>,
    nodes: &mut Vec<TocNode>,
    next_id: &mut usize,
    transform: Option<&dyn Fn(&str) -> String>,
) -> Vec<TocId> {
    let binder = Binder {
        sections,
        lookup,
        toc_count: items.len(),
        section_count,
        transform,
    };
    binder.bind(items, nodes, next_id, 0)
}

struct Binder<'a> {
    sections: &'a [SectionNode],
    lookup: &'a HashMap<String, SectionId>,
    toc_count: usize,
    section_count: usize,
    transform: Option<&'a dyn Fn(&str) -> String>,
}

impl Binder<'_> {
    fn bind(
        &self,
        items: &[TocItem],
        nodes: &mut Vec<TocNode>,
        next_id: &mut usize,
        depth: usize,
    ) -> Vec<TocId> {
        if depth >= MAX_DEPTH {
            return Vec::new();
        }

        let mut bound = Vec::with_capacity(items.len());
        for item in items {
            let id = item.id.unwrap_or(*next_id);
            // The counter advances for every visited item, pre-assigned id
            // or not, so pre-assigned items consume a counter slot. It
            // saturates rather than overflowing.
            *next_id = next_id.saturating_add(1);

            let label = match self.transform {
                Some(transform) => transform(&item.label),
                None => item.label.clone(),
            };

            let mut cfi = None;
            let mut location = None;
            if let Some(href) = item.href.as_deref()
                && let Some(section_id) = self.resolve(href)
            {
                let section = &self.sections[section_id.index()];
                cfi = section.cfi.clone();
                let (primary, _) = split_href(href);
                if section_location_applies(
                    href,
                    primary,
                    section,
                    self.toc_count,
                    self.section_count,
                ) {
                    location = section.location;
                }
            }

            let node_id = TocId(nodes.len() as u32);
            nodes.push(TocNode {
                id,
                label,
                href: item.href.clone(),
                cfi,
                location,
                subitems: Vec::new(),
            });
            let subitems = self.bind(&item.subitems, nodes, next_id, depth + 1);
            nodes[node_id.index()].subitems = subitems;
            bound.push(node_id);
        }
        bound
    }

    /// Resolve an href against the lookup map: the full href first, then
    /// its primary part, then the percent-decoded primary.
    fn resolve(&self, href: &str) -> Option<SectionId> {
        let (primary, _) = split_href(href);
        self.lookup
            .get(href)
            .or_else(|| self.lookup.get(primary))
            .or_else(|| {
                let decoded = percent_decode_str(primary).decode_utf8().ok()?;
                self.lookup.get(decoded.as_ref())
            })
            .copied()
    }
}
