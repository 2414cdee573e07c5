//! # folio
//!
//! Reading location and table-of-contents indexing for ebooks.
//!
//! Given a book's section list (sizes, linearity, nesting) and its TOC
//! tree, folio builds a global "location" coordinate system and binds the
//! TOC to it, so that progress display, TOC navigation, and
//! position-to-chapter lookup all work off one immutable index.
//!
//! ## Features
//!
//! - Location assignment: every `size_per_location` bytes of linear
//!   content is one location; sections and nested sub-items get
//!   `{current, next, total}` spans
//! - TOC binding: stable ids from a pre-order counter, href resolution
//!   against sections, CFI and location propagation
//! - EPUB CFI parsing, ordering, and binary search from a reading
//!   position to its chapter
//! - A JSON manifest boundary, CLI inspector, and WASM bindings behind
//!   the `cli` and `wasm` features
//!
//! ## Quick Start
//!
//! ```
//! use folio::{IndexOptions, LocationIndex, Section, TocItem};
//!
//! let sections = vec![
//!     Section::new("ch1", "chapter1.xhtml").with_size(1000).with_cfi("epubcfi(/6/2)"),
//!     Section::new("ch2", "chapter2.xhtml").with_size(500).with_cfi("epubcfi(/6/4)"),
//! ];
//! let toc = vec![
//!     TocItem::new("Chapter 1").with_href("ch1"),
//!     TocItem::new("Chapter 2").with_href("ch2"),
//! ];
//!
//! let options = IndexOptions::new().with_size_per_location(500);
//! let index = LocationIndex::build(&sections, &toc, &options);
//!
//! assert_eq!(index.total_locations(), 3);
//! let chapter2 = index.toc_node(index.toc_roots()[1]).unwrap();
//! assert_eq!(chapter2.location.unwrap().current, 2);
//! ```
//!
//! ## Resolving reading positions
//!
//! ```
//! use folio::{Cfi, IndexOptions, LocationIndex, Section, TocItem};
//!
//! let sections = vec![
//!     Section::new("ch1", "chapter1.xhtml").with_size(1500).with_cfi("epubcfi(/6/2)"),
//! ];
//! let toc = vec![TocItem::new("Chapter 1").with_href("ch1")];
//! let index = LocationIndex::build(&sections, &toc, &IndexOptions::new());
//!
//! let position = Cfi::parse("epubcfi(/6/2!/4/10)").unwrap();
//! assert_eq!(index.chapter_label_for(&position), Some("Chapter 1"));
//! ```

pub mod cfi;
pub mod index;
pub mod model;

#[cfg(any(feature = "cli", feature = "wasm"))]
pub mod manifest;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use cfi::Cfi;
pub use index::{
    DEFAULT_SIZE_PER_LOCATION, IndexOptions, Location, LocationIndex, SectionId, SectionNode,
    TocId, TocNode,
};
pub use model::{Linearity, Section, TocItem};

#[cfg(any(feature = "cli", feature = "wasm"))]
pub use manifest::{IndexReport, Layout, Manifest, ManifestError};
