//! WebAssembly bindings.

use wasm_bindgen::prelude::*;

use crate::bnb::{BnbConfig, BnbRunner};
use crate::matrix::CostMatrix;

/// Solves the TSP for a square cost table given as `number[][]`.
///
/// Returns the full search result (tour, status, bounds and statistics).
/// `Infinity` entries mark forbidden edges.
#[wasm_bindgen]
pub fn solve_tsp(costs: JsValue) -> Result<JsValue, JsValue> {
    let costs: Vec<Vec<f64>> = serde_wasm_bindgen::from_value(costs)
        .map_err(|e| JsValue::from_str(&format!("Invalid cost table: {e}")))?;

    let matrix = CostMatrix::from_data(&costs).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let result = BnbRunner::run(&matrix, &BnbConfig::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}
