//! Input data model for the indexing engine.
//!
//! A book arrives as two parallel structures produced by an upstream format
//! parser:
//! - **Sections**: the reading order (spine), one entry per document, each
//!   with a byte size, a linearity flag, and optional nested sub-items for
//!   finer-grained targets (named anchors, intra-file chapters).
//! - **TOC items**: the table-of-contents tree, whose hrefs point back into
//!   the section list.
//!
//! Both are plain data; the engine borrows them and never mutates them.

/// Spine linearity, as declared by the source format.
///
/// Non-linear sections (footnote files, pop-up content) stay addressable but
/// are excluded from size accumulation, so they never stretch the location
/// scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    any(feature = "cli", feature = "wasm"),
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Linearity {
    /// Part of the primary reading order.
    Yes,
    /// Auxiliary content, skipped when pacing the location scale.
    No,
    /// The source format did not say; treated as linear.
    #[default]
    Unspecified,
}

impl Linearity {
    /// Whether this section's bytes count toward the location scale.
    pub fn counts(self) -> bool {
        !matches!(self, Linearity::No)
    }
}

/// One reading-order unit of a book.
///
/// `subitems` subdivide the section into finer addressable ranges; their
/// sizes partition the parent's byte range in order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    any(feature = "cli", feature = "wasm"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Section {
    /// Stable identifier, unique within the document (e.g. a spine idref).
    pub id: String,
    /// Resolvable reference to the section's content, may carry a fragment.
    pub href: String,
    /// Spine linearity flag.
    #[cfg_attr(any(feature = "cli", feature = "wasm"), serde(default))]
    pub linear: Linearity,
    /// Content size in bytes; 0 when unknown.
    #[cfg_attr(any(feature = "cli", feature = "wasm"), serde(default))]
    pub size: usize,
    /// Canonical fragment identifier for the section start, if the format
    /// provides one.
    #[cfg_attr(any(feature = "cli", feature = "wasm"), serde(default))]
    pub cfi: Option<String>,
    /// Nested sub-ranges, same shape.
    #[cfg_attr(any(feature = "cli", feature = "wasm"), serde(default))]
    pub subitems: Vec<Section>,
}

impl Section {
    /// Create a section with the given identifier and href.
    pub fn new(id: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            linear: Linearity::default(),
            size: 0,
            cfi: None,
            subitems: Vec::new(),
        }
    }

    /// Set the content size in bytes.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the linearity flag.
    pub fn with_linear(mut self, linear: Linearity) -> Self {
        self.linear = linear;
        self
    }

    /// Set the section-start CFI.
    pub fn with_cfi(mut self, cfi: impl Into<String>) -> Self {
        self.cfi = Some(cfi.into());
        self
    }

    /// Append a nested sub-item.
    pub fn with_subitem(mut self, subitem: Section) -> Self {
        self.subitems.push(subitem);
        self
    }
}

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    any(feature = "cli", feature = "wasm"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TocItem {
    /// Pre-assigned stable id. Items without one get an id from the
    /// binder's pre-order counter.
    #[cfg_attr(any(feature = "cli", feature = "wasm"), serde(default))]
    pub id: Option<usize>,
    /// Display text.
    pub label: String,
    /// Reference into the document, may carry a `#fragment` suffix.
    #[cfg_attr(any(feature = "cli", feature = "wasm"), serde(default))]
    pub href: Option<String>,
    /// Child entries.
    #[cfg_attr(any(feature = "cli", feature = "wasm"), serde(default))]
    pub subitems: Vec<TocItem>,
}

impl TocItem {
    /// Create a TOC entry with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: label.into(),
            href: None,
            subitems: Vec::new(),
        }
    }

    /// Set a pre-assigned id.
    pub fn with_id(mut self, id: usize) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the target href.
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Append a child entry.
    pub fn with_subitem(mut self, subitem: TocItem) -> Self {
        self.subitems.push(subitem);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linearity_defaults_to_unspecified() {
        assert_eq!(Linearity::default(), Linearity::Unspecified);
        assert!(Linearity::Unspecified.counts());
        assert!(Linearity::Yes.counts());
        assert!(!Linearity::No.counts());
    }

    #[test]
    fn test_section_builder() {
        let section = Section::new("ch1", "chapter1.xhtml")
            .with_size(4096)
            .with_linear(Linearity::Yes)
            .with_cfi("epubcfi(/6/2)")
            .with_subitem(Section::new("ch1-intro", "chapter1.xhtml#intro").with_size(1024));

        assert_eq!(section.id, "ch1");
        assert_eq!(section.size, 4096);
        assert_eq!(section.cfi.as_deref(), Some("epubcfi(/6/2)"));
        assert_eq!(section.subitems.len(), 1);
        assert_eq!(section.subitems[0].href, "chapter1.xhtml#intro");
    }

    #[test]
    fn test_toc_item_builder() {
        let item = TocItem::new("Chapter 1")
            .with_id(7)
            .with_href("chapter1.xhtml#start")
            .with_subitem(TocItem::new("Section 1.1"));

        assert_eq!(item.id, Some(7));
        assert_eq!(item.label, "Chapter 1");
        assert_eq!(item.href.as_deref(), Some("chapter1.xhtml#start"));
        assert_eq!(item.subitems[0].label, "Section 1.1");
        assert_eq!(item.subitems[0].id, None);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_section_deserializes_with_defaults() {
        let section: Section =
            serde_json::from_str(r#"{"id": "ch1", "href": "chapter1.xhtml"}"#).unwrap();
        assert_eq!(section.linear, Linearity::Unspecified);
        assert_eq!(section.size, 0);
        assert!(section.cfi.is_none());
        assert!(section.subitems.is_empty());
    }
}
