use crate::error::SvgrError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_COMPONENT_NAME: &str = "SvgComponent";

/// Bindings the generated module declares or imports itself.
const RESERVED_NAMES: &[&str] = &["React", "ForwardRef", "Memo", "forwardRef", "memo", "SVGProps", "SVGRProps", "Ref"];

static INVALID_FILE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9 _-]").expect("valid regex"));
static SEPARATED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[_.\- ]+([\p{Alphabetic}\p{N}_]|$)").expect("valid regex"));
static NUMBERED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)([\p{Alphabetic}\p{N}_]|$)").expect("valid regex"));
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid regex"));

/// Caller context for one transform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<Caller>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Source text re-emitted after the generated export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_export: Option<String>,
}

/// State with the component name settled.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentState {
    pub component_name: String,
    pub file_path: Option<String>,
    pub caller: Option<Caller>,
}

impl ComponentState {
    pub fn previous_export(&self) -> Option<&str> {
        self.caller.as_ref()?.previous_export.as_deref()
    }
}

/// Settle the component name: an absent state means `SvgComponent`; a
/// supplied state needs either `componentName` or a `filePath` to derive it from.
pub fn expand_state(state: Option<&State>) -> Result<ComponentState, SvgrError> {
    let Some(state) = state else {
        return Ok(ComponentState {
            component_name: DEFAULT_COMPONENT_NAME.to_string(),
            file_path: None,
            caller: None,
        });
    };

    let component_name = match (&state.component_name, &state.file_path) {
        (Some(name), _) => name.trim().to_string(),
        (None, Some(path)) => component_name_from_path(path),
        (None, None) => {
            return Err(SvgrError::invalid_config(
                "componentName",
                "required when a state is supplied without a `filePath`",
            ))
        }
    };
    if !IDENTIFIER.is_match(&component_name) {
        return Err(SvgrError::invalid_config(
            "componentName",
            format!("{component_name:?} is not a valid identifier"),
        ));
    }
    if RESERVED_NAMES.contains(&component_name.as_str()) {
        return Err(SvgrError::invalid_config(
            "componentName",
            format!("{component_name:?} collides with a binding in the generated module"),
        ));
    }

    Ok(ComponentState {
        component_name,
        file_path: state.file_path.clone(),
        caller: state.caller.clone(),
    })
}

/// `arrow-up.svg` → `SvgArrowUp`.
pub fn component_name_from_path(file_path: &str) -> String {
    let file_name = Path::new(file_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = file_name.split('.').find(|s| !s.is_empty()).unwrap_or_default();
    let cleaned = INVALID_FILE_CHARS.replace_all(prefix, "");
    format!("Svg{}", pascal_case(&cleaned))
}

fn pascal_case(input: &str) -> String {
    let joined = SEPARATED_WORD.replace_all(input, |caps: &Captures| caps[1].to_uppercase());
    let numbered = NUMBERED_WORD.replace_all(&joined, |caps: &Captures| {
        format!("{}{}", &caps[1], caps[2].to_uppercase())
    });
    let mut chars = numbered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
