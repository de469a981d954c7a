//! Output formatting - plaintext and JSON.

use serde_json::json;

use crate::builder::AnalysisResult;

/// Render diagnostics as plain text, one per line, followed by a summary.
pub fn format_plain(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if result.diagnostics.is_empty() {
        out.push_str("No invalid message templates found.\n");
    } else {
        out.push_str(&format!(
            "INVALID MESSAGE TEMPLATES ({}):\n",
            result.diagnostics.len()
        ));
        for d in &result.diagnostics {
            out.push_str(&format!("- {}\n", d));
        }
    }
    out.push_str(&format!(
        "Checked {} call site(s) in {} dump file(s) ({} cached).\n",
        result.stats.call_sites, result.stats.analyzed_files, result.stats.cached_files
    ));
    out
}

/// Build the JSON report.
pub fn to_json(result: &AnalysisResult) -> serde_json::Value {
    json!({
        "summary": {
            "dump_files": result.stats.dump_files,
            "analyzed_files": result.stats.analyzed_files,
            "cached_files": result.stats.cached_files,
            "call_sites": result.stats.call_sites,
            "invalid_templates": result.stats.invalid_templates,
        },
        "diagnostics": result.diagnostics,
    })
}

/// Prints the report in plain text format.
pub fn print_plain(result: &AnalysisResult) {
    print!("{}", format_plain(result));
}

/// Prints the report in JSON format.
///
/// Falls back to the plain report if serialization fails.
pub fn print_json(result: &AnalysisResult) {
    match serde_json::to_string_pretty(&to_json(result)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::warn!(error = %e, "JSON serialization failed, printing plain report");
            print_plain(result);
        }
    }
}
