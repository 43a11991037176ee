//! WebAssembly bindings for flwdir.
//!
//! Grids cross the boundary as a flat `Uint8Array` of D8 codes plus
//! `(rows, cols)`. Options are a JSON string; an empty string means defaults.

use wasm_bindgen::prelude::*;

use flwdir_core::{AnalysisOptions, FlowGrid, FlowNetwork};

fn js_err<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_options(options_json: &str) -> Result<AnalysisOptions, JsValue> {
    if options_json.trim().is_empty() {
        return Ok(AnalysisOptions::default());
    }
    AnalysisOptions::from_json_str(options_json).map_err(|e| js_err(format!("Invalid options: {e}")))
}

fn build(codes: &[u8], rows: usize, cols: usize, options_json: &str) -> Result<FlowNetwork, JsValue> {
    let opts = parse_options(options_json)?;
    let grid = FlowGrid::new(rows, cols, codes.to_vec()).map_err(js_err)?;
    FlowNetwork::build(&grid, &opts).map_err(js_err)
}

/// Analyze a D8 grid.
///
/// Returns an object with `shape`, `size`, `nnodes`, `rank`, `n_upstream`
/// and `idxs_pit`.
#[wasm_bindgen]
pub fn analyze(codes: &[u8], rows: usize, cols: usize, options_json: &str) -> Result<JsValue, JsValue> {
    let network = build(codes, rows, cols, options_json)?;
    serde_wasm_bindgen::to_value(&network.into_result()).map_err(js_err)
}

/// Basin label per cell (1-based pit position, 0 for invalid cells).
#[wasm_bindgen]
pub fn basins(codes: &[u8], rows: usize, cols: usize, options_json: &str) -> Result<Vec<u32>, JsValue> {
    Ok(build(codes, rows, cols, options_json)?.basins())
}

/// Per-cell validity reasons as JSON strings (`"valid"`, `"cycle"`, ...).
#[wasm_bindgen]
pub fn cell_status(codes: &[u8], rows: usize, cols: usize, options_json: &str) -> Result<JsValue, JsValue> {
    let network = build(codes, rows, cols, options_json)?;
    let statuses = serde_json::to_string(network.validation().statuses()).map_err(js_err)?;
    Ok(JsValue::from_str(&statuses))
}
