//! JSON manifest boundary.
//!
//! Upstream format parsers hand the engine its input as a manifest: the
//! document layout, the bytes-per-location unit, the section list, and the
//! TOC tree. This module reads manifests from files/strings/readers and
//! renders a built index back out as a serializable report. It is the only
//! fallible surface of the crate; the engine itself never errors.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::index::{IndexOptions, Location, LocationIndex, SectionId, TocId};
use crate::model::{Section, TocItem};

/// Errors that can occur while loading a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Document layout, as declared by the source format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Flowing text; locations apply.
    #[default]
    Reflowable,
    /// Fixed pages; the engine is not invoked.
    PrePaginated,
}

/// One book's indexing input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Document layout; defaults to reflowable.
    #[serde(default)]
    pub layout: Layout,
    /// Bytes of linear content per location unit.
    #[serde(default = "default_size_per_location")]
    pub size_per_location: usize,
    /// Reading-order sections.
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Table-of-contents tree.
    #[serde(default)]
    pub toc: Vec<TocItem>,
}

fn default_size_per_location() -> usize {
    crate::index::DEFAULT_SIZE_PER_LOCATION
}

impl Manifest {
    /// Load a manifest from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Manifest, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a manifest from any reader producing JSON.
    pub fn from_reader(reader: impl Read) -> Result<Manifest, ManifestError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Whether this document has fixed pages instead of flowing text.
    pub fn is_fixed_layout(&self) -> bool {
        self.layout == Layout::PrePaginated
    }

    /// Index options matching this manifest's declared unit.
    pub fn options(&self) -> IndexOptions {
        IndexOptions::new().with_size_per_location(self.size_per_location)
    }

    /// Build the location index for this manifest.
    ///
    /// Fixed-layout documents are never indexed; `None` tells the caller
    /// to fall back to page-based navigation.
    pub fn index(&self, options: &IndexOptions) -> Option<LocationIndex> {
        if self.is_fixed_layout() {
            return None;
        }
        Some(LocationIndex::build(&self.sections, &self.toc, options))
    }
}

// ============================================================================
// Index reports
// ============================================================================

/// Serializable mirror of a built [`LocationIndex`], for the CLI's JSON
/// mode and the WASM bindings.
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub total_locations: usize,
    pub next_toc_id: usize,
    pub sections: Vec<SectionReport>,
    pub toc: Vec<TocReport>,
}

/// One section in an [`IndexReport`].
#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub id: String,
    pub href: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subitems: Vec<SectionReport>,
}

/// One bound TOC entry in an [`IndexReport`].
#[derive(Debug, Clone, Serialize)]
pub struct TocReport {
    pub id: usize,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subitems: Vec<TocReport>,
}

impl IndexReport {
    /// Render a built index as a report.
    pub fn from_index(index: &LocationIndex) -> IndexReport {
        IndexReport {
            total_locations: index.total_locations(),
            next_toc_id: index.next_toc_id(),
            sections: index
                .section_roots()
                .iter()
                .filter_map(|&id| section_report(index, id))
                .collect(),
            toc: index
                .toc_roots()
                .iter()
                .filter_map(|&id| toc_report(index, id))
                .collect(),
        }
    }
}

fn section_report(index: &LocationIndex, id: SectionId) -> Option<SectionReport> {
    let node = index.section(id)?;
    Some(SectionReport {
        id: node.id.clone(),
        href: node.href.clone(),
        size: node.size,
        cfi: node.cfi.as_ref().map(|cfi| cfi.to_string()),
        location: node.location,
        subitems: node
            .subitems
            .iter()
            .filter_map(|&kid| section_report(index, kid))
            .collect(),
    })
}

fn toc_report(index: &LocationIndex, id: TocId) -> Option<TocReport> {
    let node = index.toc_node(id)?;
    Some(TocReport {
        id: node.id,
        label: node.label.clone(),
        href: node.href.clone(),
        cfi: node.cfi.as_ref().map(|cfi| cfi.to_string()),
        location: node.location,
        subitems: node
            .subitems
            .iter()
            .filter_map(|&kid| toc_report(index, kid))
            .collect(),
    })
}
