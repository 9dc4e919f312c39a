//! WebAssembly bindings for phpuml
//!
//! Browser-friendly wrappers taking and returning JSON strings.

use wasm_bindgen::prelude::*;

use crate::plugins::Orchestrator;

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

/// Render a batch of PHP sources given as a JSON array of strings
///
/// # Returns
/// * JSON string with fields: uml, failures, error
#[wasm_bindgen]
pub fn render_sources(sources_json: &str) -> String {
    let sources: Vec<String> = match serde_json::from_str(sources_json) {
        Ok(sources) => sources,
        Err(e) => {
            return serde_json::json!({
                "uml": "",
                "failures": [],
                "error": format!("Invalid input: {}", e)
            })
            .to_string();
        }
    };

    match Orchestrator::new().run_with_report(&sources) {
        Ok(report) => {
            let failures: Vec<_> = report
                .failures
                .iter()
                .map(|f| serde_json::json!({ "index": f.index, "error": f.error.to_string() }))
                .collect();
            serde_json::json!({
                "uml": report.uml,
                "failures": failures,
                "error": null
            })
            .to_string()
        }
        Err(e) => serde_json::json!({
            "uml": "",
            "failures": [],
            "error": e.to_string()
        })
        .to_string(),
    }
}
