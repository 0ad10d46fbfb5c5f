//! JavaScript-facing analyzer: classification, analysis and plot samples.

use anyhow::Context;
use js_sys::Float64Array;
use mathscope_core::{
    analyze_input, classify, sample_record, AnalysisError, SampleWindow, Tolerances,
};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmAnalyzer {
    tolerances: Tolerances,
}

fn analysis_failed(err: &AnalysisError) -> String {
    format!("Analysis failed: {}", err)
}

/// Interleaved `x, y` pairs for every sample the window keeps.
pub(crate) fn interleaved_samples(
    input: &str,
    window: &SampleWindow,
    tolerances: &Tolerances,
) -> anyhow::Result<Vec<f64>> {
    let record = classify(input).context("Sampling failed")?;
    let points = sample_record(&record, window, tolerances).context("Sampling failed")?;
    Ok(points.iter().flat_map(|p| [p.x, p.y]).collect())
}

#[wasm_bindgen]
impl WasmAnalyzer {
    /// `tolerances` may be `undefined` or a partial override object.
    #[wasm_bindgen(constructor)]
    pub fn new(tolerances: JsValue) -> Result<WasmAnalyzer, JsValue> {
        console_error_panic_hook::set_once();

        let tolerances = if tolerances.is_undefined() || tolerances.is_null() {
            Tolerances::default()
        } else {
            from_value::<Tolerances>(tolerances)
                .map_err(|e| JsValue::from_str(&format!("Invalid tolerances: {}", e)))?
        };
        tolerances
            .validate()
            .map_err(|e| JsValue::from_str(&format!("Invalid tolerances: {}", e)))?;

        Ok(WasmAnalyzer { tolerances })
    }

    /// The tagged parameter record for `input`.
    pub fn classify(&self, input: &str) -> Result<JsValue, JsValue> {
        let record = classify(input).map_err(|e| JsValue::from_str(&analysis_failed(&e)))?;
        to_value(&record).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Record plus analysis for `input`.
    pub fn analyze(&self, input: &str) -> Result<JsValue, JsValue> {
        let report = analyze_input(input, &self.tolerances)
            .map_err(|e| JsValue::from_str(&analysis_failed(&e)))?;
        to_value(&report).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// One-line classification, e.g. "Right Scalene".
    pub fn summary(&self, input: &str) -> Result<String, JsValue> {
        analyze_input(input, &self.tolerances)
            .map(|report| report.analysis.classification())
            .map_err(|e| JsValue::from_str(&analysis_failed(&e)))
    }

    pub fn sample(
        &self,
        input: &str,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        samples: u32,
    ) -> Result<Float64Array, JsValue> {
        let window = SampleWindow {
            x_min,
            x_max,
            y_min,
            y_max,
            samples: samples as usize,
        };
        let values = interleaved_samples(input, &window, &self.tolerances)
            .map_err(|e| JsValue::from_str(&format!("{:#}", e)))?;
        Ok(Float64Array::from(values.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(x_min: f64, x_max: f64, samples: usize) -> SampleWindow {
        SampleWindow {
            x_min,
            x_max,
            samples,
            ..SampleWindow::default()
        }
    }

    #[test]
    fn samples_are_interleaved() {
        let values = interleaved_samples("y = 2x + 1", &window(0.0, 2.0, 3), &Tolerances::default())
            .expect("samples");
        assert_eq!(values, vec![0.0, 1.0, 1.0, 3.0, 2.0, 5.0]);
    }

    #[test]
    fn shapes_produce_no_samples() {
        let values = interleaved_samples(
            "triangle (0,0) (4,0) (0,3)",
            &SampleWindow::default(),
            &Tolerances::default(),
        )
        .expect("samples");
        assert!(values.is_empty());
    }

    #[test]
    fn sampling_errors_carry_context() {
        let err = interleaved_samples("not math", &SampleWindow::default(), &Tolerances::default())
            .expect_err("unrecognized");
        let message = format!("{:#}", err);
        assert!(message.starts_with("Sampling failed"), "{message}");
        assert!(message.contains("not math"), "{message}");

        let err = interleaved_samples("y = x", &window(1.0, 1.0, 10), &Tolerances::default())
            .expect_err("empty window");
        assert!(format!("{:#}", err).contains("x_min"));
    }

    #[test]
    fn failures_are_prefixed() {
        let message = analysis_failed(&AnalysisError::unrecognized("???"));
        assert_eq!(message, "Analysis failed: input not recognized: ???");
    }
}
