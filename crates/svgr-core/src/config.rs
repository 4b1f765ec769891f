use crate::error::SvgrError;
use indexmap::IndexMap;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Configuration as callers write it (camelCase JSON payload or TOML file).
/// Shorthands such as `icon: true` live here; run it through
/// [`ResolvedConfig::resolve`] before handing it to the pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Forward a ref to the root `<svg>`.
    #[serde(default)]
    pub r#ref: bool,
    #[serde(default)]
    pub title_prop: bool,
    #[serde(default)]
    pub desc_prop: bool,
    #[serde(default)]
    pub expand_props: ExpandProps,
    /// `false` removes `width`/`height` from the root element.
    #[serde(default = "default_true")]
    pub dimensions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub native: bool,
    #[serde(default)]
    pub svg_props: IndexMap<String, String>,
    #[serde(default)]
    pub replace_attr_values: IndexMap<String, String>,
    #[serde(default)]
    pub typescript: bool,
    #[serde(default)]
    pub memo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_type: Option<ExportType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_export: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsx_runtime: Option<JsxRuntime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsx_runtime_import: Option<JsxRuntimeImport>,
    #[serde(default = "default_true")]
    pub svgo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svgo_config: Option<serde_json::Value>,
    #[serde(default = "default_true")]
    pub prettier: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prettier_config: Option<serde_json::Value>,
    /// Resolved by the caller before the pipeline runs; carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            r#ref: false,
            title_prop: false,
            desc_prop: false,
            expand_props: ExpandProps::End,
            dimensions: true,
            icon: None,
            native: false,
            svg_props: IndexMap::new(),
            replace_attr_values: IndexMap::new(),
            typescript: false,
            memo: false,
            export_type: None,
            named_export: None,
            jsx_runtime: None,
            jsx_runtime_import: None,
            svgo: true,
            svgo_config: None,
            prettier: true,
            prettier_config: None,
            config_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Icon {
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandProps {
    None,
    Start,
    #[default]
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    Named,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JsxRuntime {
    Classic,
    ClassicPreact,
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsxRuntimeImport {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_specifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifiers: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Decode the UTF-8 JSON payload that crosses the binding boundary.
    /// Unrecognized fields are ignored.
    pub fn from_json_slice(payload: &[u8]) -> Result<Self, SvgrError> {
        if payload.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Config::default());
        }
        serde_json::from_slice(payload).map_err(|e| SvgrError::invalid_config("config", e.to_string()))
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>, SvgrError> {
        serde_json::to_vec(self).map_err(|e| SvgrError::invalid_config("config", e.to_string()))
    }
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Icon::Bool(b) => serializer.serialize_bool(*b),
            Icon::Number(n) => serializer.serialize_f64(*n),
            Icon::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Icon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IconVisitor;

        impl<'de> Visitor<'de> for IconVisitor {
            type Value = Icon;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("`icon` as a boolean, a number or a string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Icon, E> {
                Ok(Icon::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Icon, E> {
                Ok(Icon::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Icon, E> {
                Ok(Icon::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Icon, E> {
                Ok(Icon::Number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Icon, E> {
                Ok(Icon::String(v.to_string()))
            }
        }

        deserializer.deserialize_any(IconVisitor)
    }
}

impl Serialize for ExpandProps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExpandProps::None => serializer.serialize_bool(false),
            ExpandProps::Start => serializer.serialize_str("start"),
            ExpandProps::End => serializer.serialize_str("end"),
        }
    }
}

impl<'de> Deserialize<'de> for ExpandProps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExpandPropsVisitor;

        impl<'de> Visitor<'de> for ExpandPropsVisitor {
            type Value = ExpandProps;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(r#"`expandProps` as a boolean, "start" or "end""#)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<ExpandProps, E> {
                Ok(if v { ExpandProps::End } else { ExpandProps::None })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ExpandProps, E> {
                match v {
                    "start" => Ok(ExpandProps::Start),
                    "end" => Ok(ExpandProps::End),
                    _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
                }
            }
        }

        deserializer.deserialize_any(ExpandPropsVisitor)
    }
}

/// The configuration every downstream stage reads. Built once per call;
/// no shorthand forms survive resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub forward_ref: bool,
    pub title_prop: bool,
    pub desc_prop: bool,
    pub expand_props: Option<SpreadPosition>,
    pub dimensions: DimensionPolicy,
    pub native: bool,
    pub svg_props: Vec<(String, String)>,
    pub replace_attr_values: IndexMap<String, String>,
    pub typescript: bool,
    pub memo: bool,
    pub export_type: ExportType,
    pub named_export: String,
    pub runtime: Runtime,
    pub optimize: bool,
    pub optimizer_config: Option<serde_json::Value>,
    pub format: bool,
    pub formatter_config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadPosition {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DimensionPolicy {
    /// Leave the source `width`/`height` alone.
    Keep,
    /// Remove `width`/`height` from the root.
    Strip,
    /// Force both `width` and `height` to this value.
    Icon(Dimension),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    String(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Runtime {
    /// `None` under the automatic runtime, which needs no import.
    pub import: Option<JsxRuntimeImport>,
    /// Module that helper imports (`forwardRef`, `memo`, types) come from.
    pub import_source: String,
}

const DEFAULT_NAMED_EXPORT: &str = "ReactComponent";

impl ResolvedConfig {
    pub fn resolve(config: &Config) -> Result<Self, SvgrError> {
        let dimensions = if !config.dimensions {
            // Stripping wins over icon sizing.
            DimensionPolicy::Strip
        } else {
            match resolve_icon(config.icon.as_ref())? {
                Some(size) => DimensionPolicy::Icon(size),
                None => DimensionPolicy::Keep,
            }
        };

        let expand_props = match config.expand_props {
            ExpandProps::None => None,
            ExpandProps::Start => Some(SpreadPosition::Start),
            ExpandProps::End => Some(SpreadPosition::End),
        };

        if config.native && (config.title_prop || config.desc_prop) {
            let key = if config.title_prop { "titleProp" } else { "descProp" };
            return Err(SvgrError::invalid_config(
                key,
                "react-native-svg has no <title>/<desc> element; cannot be combined with `native`",
            ));
        }
        if config.native && config.jsx_runtime == Some(JsxRuntime::ClassicPreact) {
            return Err(SvgrError::invalid_config(
                "jsxRuntime",
                "`classic-preact` cannot be combined with `native`",
            ));
        }

        let runtime = resolve_runtime(config)?;

        if let Some(name) = &config.named_export {
            if name.trim().is_empty() {
                return Err(SvgrError::invalid_config("namedExport", "must not be empty"));
            }
        }
        // An explicit `namedExport` wins over `exportType`.
        let export_type = match (config.export_type, &config.named_export) {
            (Some(ExportType::Named), _) | (_, Some(_)) => ExportType::Named,
            _ => ExportType::Default,
        };

        Ok(Self {
            forward_ref: config.r#ref,
            title_prop: config.title_prop,
            desc_prop: config.desc_prop,
            expand_props,
            dimensions,
            native: config.native,
            svg_props: config
                .svg_props
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            replace_attr_values: config.replace_attr_values.clone(),
            typescript: config.typescript,
            memo: config.memo,
            export_type,
            named_export: config
                .named_export
                .clone()
                .unwrap_or_else(|| DEFAULT_NAMED_EXPORT.to_string()),
            runtime,
            optimize: config.svgo,
            optimizer_config: config.svgo_config.clone(),
            format: config.prettier,
            formatter_config: config.prettier_config.clone(),
        })
    }
}

fn resolve_icon(icon: Option<&Icon>) -> Result<Option<Dimension>, SvgrError> {
    match icon {
        None | Some(Icon::Bool(false)) => Ok(None),
        Some(Icon::Bool(true)) => Ok(Some(Dimension::String("1em".to_string()))),
        Some(Icon::Number(n)) => {
            if !n.is_finite() || *n <= 0.0 {
                return Err(SvgrError::invalid_config(
                    "icon",
                    format!("size must be a positive number, got {n}"),
                ));
            }
            Ok(Some(Dimension::Number(*n)))
        }
        Some(Icon::String(s)) => {
            if s.trim().is_empty() {
                return Err(SvgrError::invalid_config("icon", "size must not be an empty string"));
            }
            Ok(Some(Dimension::String(s.trim().to_string())))
        }
    }
}

fn resolve_runtime(config: &Config) -> Result<Runtime, SvgrError> {
    if let Some(custom) = &config.jsx_runtime_import {
        if config.jsx_runtime == Some(JsxRuntime::Automatic) {
            return Err(SvgrError::invalid_config(
                "jsxRuntimeImport",
                "cannot be combined with the `automatic` runtime, which adds no import",
            ));
        }
        if custom.source.trim().is_empty() {
            return Err(SvgrError::invalid_config("jsxRuntimeImport", "`source` must not be empty"));
        }
        let has_specifiers = custom.specifiers.as_ref().is_some_and(|s| !s.is_empty());
        if custom.namespace.is_none() && custom.default_specifier.is_none() && !has_specifiers {
            return Err(SvgrError::invalid_config(
                "jsxRuntimeImport",
                r#"specify "namespace", "defaultSpecifier", or "specifiers""#,
            ));
        }
        return Ok(Runtime {
            import: Some(custom.clone()),
            import_source: custom.source.clone(),
        });
    }

    Ok(match config.jsx_runtime.unwrap_or(JsxRuntime::Classic) {
        JsxRuntime::Classic => Runtime {
            import: Some(JsxRuntimeImport {
                source: "react".to_string(),
                namespace: Some("React".to_string()),
                ..Default::default()
            }),
            import_source: "react".to_string(),
        },
        JsxRuntime::ClassicPreact => Runtime {
            import: Some(JsxRuntimeImport {
                source: "preact".to_string(),
                specifiers: Some(vec!["h".to_string()]),
                ..Default::default()
            }),
            import_source: "preact".to_string(),
        },
        JsxRuntime::Automatic => Runtime {
            import: None,
            import_source: "react".to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_json(json: &str) -> Result<ResolvedConfig, SvgrError> {
        let config = Config::from_json_slice(json.as_bytes())?;
        ResolvedConfig::resolve(&config)
    }

    #[test]
    fn test_defaults() {
        let resolved = resolve_json("{}").unwrap();
        assert_eq!(resolved.expand_props, Some(SpreadPosition::End));
        assert_eq!(resolved.dimensions, DimensionPolicy::Keep);
        assert_eq!(resolved.export_type, ExportType::Default);
        assert_eq!(resolved.named_export, "ReactComponent");
        assert_eq!(resolved.runtime.import_source, "react");
        assert_eq!(
            resolved.runtime.import.unwrap().namespace.as_deref(),
            Some("React")
        );
        assert!(resolved.optimize);
        assert!(resolved.format);
    }

    #[test]
    fn test_empty_payload_is_default() {
        let config = Config::from_json_slice(b"  ").unwrap();
        assert!(config.dimensions);
        assert_eq!(config.expand_props, ExpandProps::End);
    }

    #[test]
    fn test_icon_shortcuts() {
        let cases = [
            (r#"{"icon": true}"#, Dimension::String("1em".to_string())),
            (r#"{"icon": 24}"#, Dimension::Number(24.0)),
            (r#"{"icon": "2em"}"#, Dimension::String("2em".to_string())),
        ];
        for (json, expected) in cases {
            let resolved = resolve_json(json).unwrap();
            assert_eq!(resolved.dimensions, DimensionPolicy::Icon(expected), "{json}");
        }
        assert_eq!(resolve_json(r#"{"icon": false}"#).unwrap().dimensions, DimensionPolicy::Keep);
    }

    #[test]
    fn test_dimensions_false_wins_over_icon() {
        let resolved = resolve_json(r#"{"icon": true, "dimensions": false}"#).unwrap();
        assert_eq!(resolved.dimensions, DimensionPolicy::Strip);
    }

    #[test]
    fn test_icon_outside_domain() {
        let err = resolve_json(r#"{"icon": {"size": 1}}"#).unwrap_err();
        assert!(matches!(err, SvgrError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("`icon`"), "{err}");

        let err = resolve_json(r#"{"icon": -4}"#).unwrap_err();
        assert!(matches!(err, SvgrError::InvalidConfiguration { ref key, .. } if key == "icon"));
    }

    #[test]
    fn test_expand_props_forms() {
        assert_eq!(resolve_json(r#"{"expandProps": false}"#).unwrap().expand_props, None);
        assert_eq!(
            resolve_json(r#"{"expandProps": true}"#).unwrap().expand_props,
            Some(SpreadPosition::End)
        );
        assert_eq!(
            resolve_json(r#"{"expandProps": "start"}"#).unwrap().expand_props,
            Some(SpreadPosition::Start)
        );
        let err = resolve_json(r#"{"expandProps": "middle"}"#).unwrap_err();
        assert!(err.to_string().contains("expandProps"), "{err}");
    }

    #[test]
    fn test_named_export_implies_named() {
        let resolved = resolve_json(r#"{"namedExport": "Icon"}"#).unwrap();
        assert_eq!(resolved.export_type, ExportType::Named);
        assert_eq!(resolved.named_export, "Icon");

        let resolved = resolve_json(r#"{"exportType": "named"}"#).unwrap();
        assert_eq!(resolved.export_type, ExportType::Named);
        assert_eq!(resolved.named_export, "ReactComponent");

        let resolved = resolve_json(r#"{"exportType": "default", "namedExport": "Icon"}"#).unwrap();
        assert_eq!(resolved.export_type, ExportType::Named);
        assert_eq!(resolved.named_export, "Icon");
    }

    #[test]
    fn test_runtimes() {
        let preact = resolve_json(r#"{"jsxRuntime": "classic-preact"}"#).unwrap().runtime;
        assert_eq!(preact.import_source, "preact");
        assert_eq!(preact.import.unwrap().specifiers, Some(vec!["h".to_string()]));

        let automatic = resolve_json(r#"{"jsxRuntime": "automatic"}"#).unwrap().runtime;
        assert!(automatic.import.is_none());

        let custom = resolve_json(
            r#"{"jsxRuntimeImport": {"source": "hyperapp-jsx-pragma", "defaultSpecifier": "h"}}"#,
        )
        .unwrap()
        .runtime;
        assert_eq!(custom.import_source, "hyperapp-jsx-pragma");
        assert_eq!(custom.import.unwrap().default_specifier.as_deref(), Some("h"));
    }

    #[test]
    fn test_unknown_runtime_is_rejected() {
        assert!(resolve_json(r#"{"jsxRuntime": "solid"}"#).is_err());
    }

    #[test]
    fn test_mutually_exclusive_combinations() {
        let cases = [
            (r#"{"native": true, "titleProp": true}"#, "titleProp"),
            (r#"{"native": true, "descProp": true}"#, "descProp"),
            (r#"{"native": true, "jsxRuntime": "classic-preact"}"#, "jsxRuntime"),
            (
                r#"{"jsxRuntime": "automatic", "jsxRuntimeImport": {"source": "x", "namespace": "X"}}"#,
                "jsxRuntimeImport",
            ),
            (r#"{"jsxRuntimeImport": {"source": "x"}}"#, "jsxRuntimeImport"),
            (r#"{"namedExport": ""}"#, "namedExport"),
        ];
        for (json, expected_key) in cases {
            match resolve_json(json) {
                Err(SvgrError::InvalidConfiguration { key, .. }) => assert_eq!(key, expected_key, "{json}"),
                other => panic!("{json}: expected InvalidConfiguration, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let config = Config::from_json_slice(br#"{"index": true, "runtimeConfig": false, "memo": true}"#).unwrap();
        assert!(config.memo);
    }

    #[test]
    fn test_ordered_maps_keep_insertion_order() {
        let config = Config::from_json_slice(br#"{"svgProps": {"z": "1", "a": "2", "m": "3"}}"#).unwrap();
        let keys: Vec<&str> = config.svg_props.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_payload_round_trip() {
        let config = Config::from_json_slice(
            br##"{"icon": 24, "expandProps": "start", "jsxRuntime": "automatic", "replaceAttrValues": {"#000": "currentColor"}}"##,
        )
        .unwrap();
        let again = Config::from_json_slice(&config.to_json_vec().unwrap()).unwrap();
        assert_eq!(
            ResolvedConfig::resolve(&again).unwrap(),
            ResolvedConfig::resolve(&config).unwrap()
        );
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r##"
ref = true
titleProp = true
expandProps = "start"
icon = "1.5em"
jsxRuntime = "automatic"

[svgProps]
role = "img"

[replaceAttrValues]
"#063855" = "currentColor"
"##;
        let config = Config::from_toml(toml_str).unwrap();
        assert!(config.r#ref);
        assert!(config.title_prop);
        assert_eq!(config.expand_props, ExpandProps::Start);
        assert_eq!(config.icon, Some(Icon::String("1.5em".to_string())));
        assert_eq!(config.jsx_runtime, Some(JsxRuntime::Automatic));
        assert_eq!(config.svg_props.get("role").map(String::as_str), Some("img"));
        assert_eq!(
            config.replace_attr_values.get("#063855").map(String::as_str),
            Some("currentColor")
        );
    }
}
