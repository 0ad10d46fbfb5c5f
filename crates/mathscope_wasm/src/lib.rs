//! WASM bridge for the mathscope analysis core.

mod analyzer;

pub use analyzer::WasmAnalyzer;
