use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use svgr_core::state::ComponentState;
use svgr_core::{Collaborators, Formatter, LineFormatter, Optimizer, PassthroughOptimizer, State};
use wasm_bindgen::prelude::*;

/// `transform(code, configBytes, state?, collaborators?) → Promise<string>`.
///
/// `config` is the UTF-8 JSON configuration payload. `collaborators` may
/// carry `optimize(svg, svgoConfig, state)` and `format(code, prettierConfig)`
/// functions returning strings; missing ones fall back to the built-ins.
#[wasm_bindgen]
pub fn transform(code: &str, config: &[u8], state: JsValue, collaborators: JsValue) -> Promise {
    match run(code, config, state, collaborators) {
        Ok(output) => Promise::resolve(&JsValue::from_str(&output)),
        Err(message) => Promise::reject(&JsError::new(&message).into()),
    }
}

fn run(code: &str, config: &[u8], state: JsValue, collaborators: JsValue) -> Result<String, String> {
    let state: Option<State> = if state.is_undefined() || state.is_null() {
        None
    } else {
        Some(serde_wasm_bindgen::from_value(state).map_err(|e| format!("Invalid state: {e}"))?)
    };

    let optimizer = get_function(&collaborators, "optimize").map(|func| JsOptimizer { func });
    let formatter = get_function(&collaborators, "format").map(|func| JsFormatter { func });
    let collaborators = Collaborators {
        optimizer: match &optimizer {
            Some(js) => js as &dyn Optimizer,
            None => &PassthroughOptimizer,
        },
        formatter: match &formatter {
            Some(js) => js as &dyn Formatter,
            None => &LineFormatter,
        },
    };

    svgr_core::transform_payload(code, config, state.as_ref(), &collaborators).map_err(|e| e.to_string())
}

struct JsOptimizer {
    func: Function,
}

impl Optimizer for JsOptimizer {
    fn optimize(
        &self,
        svg: &str,
        config: Option<&serde_json::Value>,
        state: &ComponentState,
    ) -> Result<String, String> {
        let js_state = Object::new();
        Reflect::set(
            &js_state,
            &JsValue::from_str("componentName"),
            &JsValue::from_str(&state.component_name),
        )
        .ok();
        if let Some(path) = &state.file_path {
            Reflect::set(&js_state, &JsValue::from_str("filePath"), &JsValue::from_str(path)).ok();
        }

        let result = self
            .func
            .call3(&JsValue::NULL, &JsValue::from_str(svg), &to_js(config)?, &js_state)
            .map_err(|e| js_error_message(&e))?;
        result
            .as_string()
            .ok_or_else(|| "optimize() must return a string".to_string())
    }
}

struct JsFormatter {
    func: Function,
}

impl Formatter for JsFormatter {
    fn format(&self, code: &str, config: Option<&serde_json::Value>) -> Result<String, String> {
        let result = self
            .func
            .call2(&JsValue::NULL, &JsValue::from_str(code), &to_js(config)?)
            .map_err(|e| js_error_message(&e))?;
        result
            .as_string()
            .ok_or_else(|| "format() must return a string".to_string())
    }
}

fn to_js(value: Option<&serde_json::Value>) -> Result<JsValue, String> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    match value {
        Some(v) => v.serialize(&serializer).map_err(|e| e.to_string()),
        None => Ok(JsValue::UNDEFINED),
    }
}

fn js_error_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "collaborator threw a non-Error value".to_string())
}

fn get_function(obj: &JsValue, key: &str) -> Option<Function> {
    if obj.is_undefined() || obj.is_null() {
        return None;
    }
    Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .filter(|v| v.is_function())
        .map(|v| v.unchecked_into())
}
