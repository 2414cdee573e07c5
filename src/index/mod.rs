//! The location index: a book's reading coordinate system.
//!
//! [`LocationIndex::build`] runs the whole pipeline over borrowed input:
//! intern the section tree into a flat arena, accumulate effective sizes,
//! assign `{current, next, total}` location triples, build the href/id
//! lookup map, bind the TOC against it, and optionally sort the TOC into
//! document order. The result is immutable and self-contained; nodes
//! reference each other through integer arena ids, never back-pointers.

mod bind;
mod locate;
mod lookup;
mod search;
mod sort;

use std::collections::HashMap;

use crate::cfi::Cfi;
use crate::model::{Linearity, Section, TocItem};

/// Conventional bytes-per-location unit: roughly one printed page of
/// uncompressed markup.
pub const DEFAULT_SIZE_PER_LOCATION: usize = 1500;

/// Recursion cap shared by interning, subdivision, lookup, binding, and
/// search refinement. Trees deeper than this are cut off rather than
/// followed.
pub(crate) const MAX_DEPTH: usize = 64;

/// Arena id of a section node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(pub u32);

impl SectionId {
    /// Arena slot of this id.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena id of a bound TOC node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TocId(pub u32);

impl TocId {
    /// Arena slot of this id.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A reading position expressed on the book-wide location scale.
///
/// `total` is the same for every node of one index; `current..next` is the
/// half-open span the node covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(feature = "cli", feature = "wasm"), derive(serde::Serialize))]
pub struct Location {
    /// First location of the node.
    pub current: usize,
    /// First location after the node (the next sibling's `current`).
    pub next: usize,
    /// Location count of the whole book.
    pub total: usize,
}

impl Location {
    /// Number of locations this node covers.
    pub fn span(&self) -> usize {
        self.next.saturating_sub(self.current)
    }

    /// Progress through the book at this node's start, in `0.0..=1.0`.
    /// 0.0 when the book has no locations.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// An interned section: the input [`Section`] plus its parsed CFI and
/// assigned location, children as arena ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionNode {
    /// Stable identifier from the input.
    pub id: String,
    /// Reference string from the input.
    pub href: String,
    /// Spine linearity flag.
    pub linear: Linearity,
    /// Content size in bytes.
    pub size: usize,
    /// Parsed section-start CFI, when the input carried a valid one.
    pub cfi: Option<Cfi>,
    /// Assigned location span.
    pub location: Option<Location>,
    /// Child arena ids, input order.
    pub subitems: Vec<SectionId>,
}

/// A bound TOC entry: id assigned, label transformed, CFI and location
/// copied from its resolved section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocNode {
    /// Stable id: pre-assigned by the input or taken from the binder's
    /// counter.
    pub id: usize,
    /// Display text, after the label transform.
    pub label: String,
    /// Original target href.
    pub href: Option<String>,
    /// CFI of the resolved section.
    pub cfi: Option<Cfi>,
    /// Location of the resolved section, when the trust rule applied.
    pub location: Option<Location>,
    /// Child arena ids, input order.
    pub subitems: Vec<TocId>,
}

/// Knobs for one [`LocationIndex::build`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// Bytes of linear content per location unit. Supplied by the caller;
    /// [`DEFAULT_SIZE_PER_LOCATION`] is the conventional value.
    pub size_per_location: usize,
    /// Sort top-level TOC entries into document order after binding.
    pub sort_toc: bool,
    /// Initial value of the TOC id counter.
    pub first_toc_id: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            size_per_location: DEFAULT_SIZE_PER_LOCATION,
            sort_toc: false,
            first_toc_id: 0,
        }
    }
}

impl IndexOptions {
    /// Options with the conventional unit and no post-passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bytes-per-location unit.
    pub fn with_size_per_location(mut self, size_per_location: usize) -> Self {
        self.size_per_location = size_per_location;
        self
    }

    /// Enable the TOC sort post-pass.
    pub fn with_sort_toc(mut self, sort_toc: bool) -> Self {
        self.sort_toc = sort_toc;
        self
    }

    /// Start the TOC id counter at `first_toc_id`.
    pub fn with_first_toc_id(mut self, first_toc_id: usize) -> Self {
        self.first_toc_id = first_toc_id;
        self
    }
}

/// The built index: section and TOC arenas, the lookup map, and the
/// book-wide totals.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationIndex {
    sections: Vec<SectionNode>,
    section_roots: Vec<SectionId>,
    toc: Vec<TocNode>,
    toc_roots: Vec<TocId>,
    lookup: HashMap<String, SectionId>,
    total_locations: usize,
    next_toc_id: usize,
}

impl LocationIndex {
    /// Build the index for one book.
    pub fn build(sections: &[Section], toc: &[TocItem], options: &IndexOptions) -> Self {
        Self::build_with_labels(sections, toc, options, None)
    }

    /// Build the index, passing every TOC label through `label_transform`
    /// (script conversion, normalization — any pure string map).
    pub fn build_with_labels(
        sections: &[Section],
        toc: &[TocItem],
        options: &IndexOptions,
        label_transform: Option<&dyn Fn(&str) -> String>,
    ) -> Self {
        let (mut section_nodes, section_roots) = intern_sections(sections);
        let sums = locate::accumulate_sizes(&section_nodes, &section_roots);
        let total_locations = locate::assign_locations(
            &mut section_nodes,
            &section_roots,
            &sums,
            options.size_per_location,
        );
        let lookup = lookup::build_section_lookup(&section_nodes, &section_roots);

        let mut toc_nodes = Vec::new();
        let mut next_toc_id = options.first_toc_id;
        let mut toc_roots = bind::bind_toc(
            toc,
            &section_nodes,
            section_roots.len(),
            &lookup,
            &mut toc_nodes,
            &mut next_toc_id,
            label_transform,
        );
        if options.sort_toc {
            sort::sort_toc(&mut toc_roots, &toc_nodes);
        }

        Self {
            sections: section_nodes,
            section_roots,
            toc: toc_nodes,
            toc_roots,
            lookup,
            total_locations,
            next_toc_id,
        }
    }

    /// Location count of the whole book.
    pub fn total_locations(&self) -> usize {
        self.total_locations
    }

    /// First id the binder's counter did not hand out. Useful when binding
    /// further TOC fragments against the same id space.
    pub fn next_toc_id(&self) -> usize {
        self.next_toc_id
    }

    /// Top-level sections, reading order.
    pub fn section_roots(&self) -> &[SectionId] {
        &self.section_roots
    }

    /// Top-level TOC entries (sorted when the options asked for it).
    pub fn toc_roots(&self) -> &[TocId] {
        &self.toc_roots
    }

    /// The whole section arena.
    pub fn sections(&self) -> &[SectionNode] {
        &self.sections
    }

    /// The whole TOC arena.
    pub fn toc_nodes(&self) -> &[TocNode] {
        &self.toc
    }

    /// Get a section node by arena id.
    pub fn section(&self, id: SectionId) -> Option<&SectionNode> {
        self.sections.get(id.index())
    }

    /// Get a TOC node by arena id.
    pub fn toc_node(&self, id: TocId) -> Option<&TocNode> {
        self.toc.get(id.index())
    }

    /// Resolve a lookup key (top-level section id or sub-item href) to its
    /// section node.
    pub fn section_by_key(&self, key: &str) -> Option<&SectionNode> {
        self.lookup
            .get(key)
            .and_then(|&id| self.sections.get(id.index()))
    }

    /// Find the TOC entry containing a CFI.
    pub fn find_by_cfi(&self, target: &Cfi) -> Option<TocId> {
        search::find_in(&self.toc, &self.toc_roots, target, 0)
    }

    /// Label of the TOC entry containing a CFI: the chapter title to show
    /// for a reading position.
    pub fn chapter_label_for(&self, target: &Cfi) -> Option<&str> {
        let id = self.find_by_cfi(target)?;
        self.toc.get(id.index()).map(|node| node.label.as_str())
    }
}

/// Copy the input section trees into a flat arena, parsing CFI strings
/// along the way. Returns the arena and the top-level ordering.
pub(crate) fn intern_sections(sections: &[Section]) -> (Vec<SectionNode>, Vec<SectionId>) {
    let mut nodes = Vec::new();
    let mut roots = Vec::with_capacity(sections.len());
    for section in sections {
        roots.push(intern_section(section, &mut nodes, 0));
    }
    (nodes, roots)
}

fn intern_section(section: &Section, nodes: &mut Vec<SectionNode>, depth: usize) -> SectionId {
    let node_id = SectionId(nodes.len() as u32);
    nodes.push(SectionNode {
        id: section.id.clone(),
        href: section.href.clone(),
        linear: section.linear,
        size: section.size,
        cfi: section.cfi.as_deref().and_then(Cfi::parse),
        location: None,
        subitems: Vec::new(),
    });
    if depth + 1 < MAX_DEPTH {
        let subitems = section
            .subitems
            .iter()
            .map(|subitem| intern_section(subitem, nodes, depth + 1))
            .collect();
        nodes[node_id.index()].subitems = subitems;
    }
    node_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_sections() -> Vec<Section> {
        vec![
            Section::new("ch1", "chapter1.xhtml")
                .with_size(1000)
                .with_cfi("epubcfi(/6/2)"),
            Section::new("ch2", "chapter2.xhtml")
                .with_size(500)
                .with_cfi("epubcfi(/6/4)"),
            Section::new("ch3", "chapter3.xhtml")
                .with_size(1500)
                .with_cfi("epubcfi(/6/6)"),
        ]
    }

    fn book_toc() -> Vec<TocItem> {
        vec![
            TocItem::new("Chapter 1").with_href("ch1"),
            TocItem::new("Chapter 2").with_href("ch2"),
            TocItem::new("Chapter 3").with_href("ch3"),
        ]
    }

    #[test]
    fn test_build_assigns_locations_and_binds_toc() {
        let options = IndexOptions::new().with_size_per_location(500);
        let index = LocationIndex::build(&book_sections(), &book_toc(), &options);

        assert_eq!(index.total_locations(), 6);
        assert_eq!(index.next_toc_id(), 3);

        let spans: Vec<Location> = index
            .section_roots()
            .iter()
            .map(|&id| index.section(id).unwrap().location.unwrap())
            .collect();
        assert_eq!(
            spans,
            vec![
                Location { current: 0, next: 2, total: 6 },
                Location { current: 2, next: 3, total: 6 },
                Location { current: 3, next: 6, total: 6 },
            ]
        );

        let chapter2 = index.toc_node(index.toc_roots()[1]).unwrap();
        assert_eq!(chapter2.id, 1);
        assert_eq!(chapter2.location, Some(Location { current: 2, next: 3, total: 6 }));
    }

    #[test]
    fn test_build_twice_yields_equal_indexes() {
        let options = IndexOptions::new().with_size_per_location(500);
        let first = LocationIndex::build(&book_sections(), &book_toc(), &options);
        let second = LocationIndex::build(&book_sections(), &book_toc(), &options);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_book_builds_empty_index() {
        let index = LocationIndex::build(&[], &[], &IndexOptions::new());
        assert_eq!(index.total_locations(), 0);
        assert!(index.section_roots().is_empty());
        assert!(index.toc_roots().is_empty());
        assert_eq!(index.find_by_cfi(&Cfi::from_spine_index(0)), None);
    }

    #[test]
    fn test_section_by_key_covers_ids_and_subitem_hrefs() {
        let sections = vec![
            Section::new("ch1", "chapter1.xhtml")
                .with_size(1000)
                .with_subitem(Section::new("ch1-a", "chapter1.xhtml#a").with_size(400)),
        ];
        let index = LocationIndex::build(&sections, &[], &IndexOptions::new());

        assert_eq!(index.section_by_key("ch1").map(|s| s.id.as_str()), Some("ch1"));
        assert_eq!(
            index.section_by_key("chapter1.xhtml#a").map(|s| s.id.as_str()),
            Some("ch1-a")
        );
        assert_eq!(index.section_by_key("chapter1.xhtml"), None);
    }

    #[test]
    fn test_sections_beyond_max_depth_are_dropped() {
        let mut section = Section::new("leaf", "deep.xhtml#leaf").with_size(10);
        for depth in (0..(MAX_DEPTH + 5)).rev() {
            section = Section::new(format!("s{depth}"), format!("deep.xhtml#s{depth}"))
                .with_size(10)
                .with_subitem(section);
        }
        let index = LocationIndex::build(&[section], &[], &IndexOptions::new());

        assert_eq!(index.sections().len(), MAX_DEPTH);
        // Every interned level is walked and addressable; the cut level's
        // children are gone from the arena and the lookup alike.
        assert!(index.sections().iter().all(|node| node.location.is_some()));
        let deepest = index
            .section_by_key(&format!("deep.xhtml#s{}", MAX_DEPTH - 1))
            .unwrap();
        assert!(deepest.subitems.is_empty());
        assert_eq!(
            index.section_by_key(&format!("deep.xhtml#s{MAX_DEPTH}")),
            None
        );
        assert_eq!(index.section_by_key("deep.xhtml#leaf"), None);
    }

    #[test]
    fn test_find_by_cfi_and_chapter_label() {
        let options = IndexOptions::new().with_size_per_location(500);
        let index = LocationIndex::build(&book_sections(), &book_toc(), &options);

        let inside_ch2 = Cfi::parse("epubcfi(/6/5)").unwrap();
        assert_eq!(index.chapter_label_for(&inside_ch2), Some("Chapter 2"));

        let before_everything = Cfi::parse("epubcfi(/6/1)").unwrap();
        assert_eq!(index.chapter_label_for(&before_everything), None);
    }

    #[test]
    fn test_sort_toc_option_reorders_roots() {
        let toc = vec![
            TocItem::new("Chapter 3").with_href("ch3"),
            TocItem::new("Chapter 1").with_href("ch1"),
            TocItem::new("Chapter 2").with_href("ch2"),
        ];
        let options = IndexOptions::new()
            .with_size_per_location(500)
            .with_sort_toc(true);
        let index = LocationIndex::build(&book_sections(), &toc, &options);

        let labels: Vec<&str> = index
            .toc_roots()
            .iter()
            .map(|&id| index.toc_node(id).unwrap().label.as_str())
            .collect();
        assert_eq!(labels, vec!["Chapter 1", "Chapter 2", "Chapter 3"]);
        // Ids were assigned before sorting, in input order.
        let ids: Vec<usize> = index
            .toc_roots()
            .iter()
            .map(|&id| index.toc_node(id).unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn test_first_toc_id_offsets_the_counter() {
        let options = IndexOptions::new().with_first_toc_id(100);
        let index = LocationIndex::build(&[], &book_toc(), &options);
        let ids: Vec<usize> = index
            .toc_roots()
            .iter()
            .map(|&id| index.toc_node(id).unwrap().id)
            .collect();
        assert_eq!(ids, vec![100, 101, 102]);
        assert_eq!(index.next_toc_id(), 103);
    }

    #[test]
    fn test_label_transform_reaches_every_entry() {
        let toc = vec![TocItem::new("first").with_subitem(TocItem::new("second"))];
        let transform = |label: &str| format!("* {label}");
        let index = LocationIndex::build_with_labels(
            &[],
            &toc,
            &IndexOptions::new(),
            Some(&transform),
        );

        let root = index.toc_node(index.toc_roots()[0]).unwrap();
        assert_eq!(root.label, "* first");
        assert_eq!(
            index.toc_node(root.subitems[0]).unwrap().label,
            "* second"
        );
    }

    #[test]
    fn test_location_span_and_fraction() {
        let location = Location { current: 25, next: 30, total: 100 };
        assert_eq!(location.span(), 5);
        assert!((location.fraction() - 0.25).abs() < f64::EPSILON);

        let empty = Location { current: 0, next: 0, total: 0 };
        assert_eq!(empty.span(), 0);
        assert_eq!(empty.fraction(), 0.0);
    }
}
