//! WASM bindings for browser-based reader shells.
//!
//! This module exposes the indexing pipeline to JavaScript via
//! wasm-bindgen: manifest JSON in, report JSON (or a chapter label) out.

use wasm_bindgen::prelude::*;

use crate::cfi::Cfi;
use crate::manifest::{IndexReport, Manifest};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Build the location index for a manifest.
///
/// Takes manifest JSON and returns the index report as JSON. Fixed-layout
/// manifests are an error: they have no location index.
#[wasm_bindgen]
pub fn index_manifest(manifest_json: &str) -> Result<String, JsValue> {
    let manifest =
        Manifest::from_json(manifest_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let Some(index) = manifest.index(&manifest.options()) else {
        return Err(JsValue::from_str(
            "fixed-layout document has no location index",
        ));
    };
    let report = IndexReport::from_index(&index);
    serde_json::to_string(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Resolve the chapter label containing a CFI.
///
/// Returns null when the manifest is fixed-layout, the CFI is malformed,
/// or no chapter contains the position.
#[wasm_bindgen]
pub fn chapter_at(manifest_json: &str, cfi: &str) -> Result<Option<String>, JsValue> {
    let manifest =
        Manifest::from_json(manifest_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let Some(index) = manifest.index(&manifest.options()) else {
        return Ok(None);
    };
    let Some(target) = Cfi::parse(cfi) else {
        return Ok(None);
    };
    Ok(index.chapter_label_for(&target).map(String::from))
}
