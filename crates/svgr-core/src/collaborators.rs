//! The optimizer and formatter sit outside the core. The pipeline only sees
//! them through these traits, so callers (the WASM binding, tests) can plug
//! in their own engines.

use crate::state::ComponentState;

/// Cleans raw SVG text before parsing.
pub trait Optimizer {
    fn optimize(
        &self,
        svg: &str,
        config: Option<&serde_json::Value>,
        state: &ComponentState,
    ) -> Result<String, String>;
}

/// Canonicalizes generated source text.
pub trait Formatter {
    fn format(&self, code: &str, config: Option<&serde_json::Value>) -> Result<String, String>;
}

/// Returns the markup unchanged.
pub struct PassthroughOptimizer;

impl Optimizer for PassthroughOptimizer {
    fn optimize(&self, svg: &str, _config: Option<&serde_json::Value>, _state: &ComponentState) -> Result<String, String> {
        Ok(svg.to_string())
    }
}

/// Whitespace-only formatting: `\n` line endings, no trailing whitespace,
/// at most one blank line in a row, exactly one final newline.
pub struct LineFormatter;

impl Formatter for LineFormatter {
    fn format(&self, code: &str, _config: Option<&serde_json::Value>) -> Result<String, String> {
        Ok(normalize_lines(code))
    }
}

fn normalize_lines(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut blank_run = 0u32;

    for line in input.replace("\r\n", "\n").replace('\r', "\n").lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || result.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push_str(line);
        result.push('\n');
    }

    while result.ends_with("\n\n") {
        result.pop();
    }
    if result.is_empty() {
        result.push('\n');
    }
    result
}

/// The pair of engines one transform runs with.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub optimizer: &'a dyn Optimizer,
    pub formatter: &'a dyn Formatter,
}

impl Default for Collaborators<'static> {
    fn default() -> Self {
        Self {
            optimizer: &PassthroughOptimizer,
            formatter: &LineFormatter,
        }
    }
}
