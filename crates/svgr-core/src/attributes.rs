//! Markup tree → element tree: attribute renaming, value classification,
//! `replaceAttrValues` substitution and text handling.

use crate::ast::*;
use crate::config::ResolvedConfig;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?\d+(\.\d+)?$").expect("valid regex"));
static LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\t\r\n\u{85}\u{2028}\u{2029}]+").expect("valid regex"));
static HYPHENATED: Lazy<Regex> = Lazy::new(|| Regex::new(r"-(.)").expect("valid regex"));

/// SVG/XML attribute names that differ from their React prop names.
/// Anything absent here (including `aria-*` and `data-*`) is kept verbatim.
const ATTRIBUTE_NAMES: &[(&str, &str)] = &[
    // namespaced
    ("xlink:actuate", "xlinkActuate"),
    ("xlink:arcrole", "xlinkArcrole"),
    ("xlink:href", "xlinkHref"),
    ("xlink:role", "xlinkRole"),
    ("xlink:show", "xlinkShow"),
    ("xlink:title", "xlinkTitle"),
    ("xlink:type", "xlinkType"),
    ("xml:base", "xmlBase"),
    ("xml:lang", "xmlLang"),
    ("xml:space", "xmlSpace"),
    ("xmlns:xlink", "xmlnsXlink"),
    // reserved words
    ("class", "className"),
    ("for", "htmlFor"),
    ("tabindex", "tabIndex"),
    ("crossorigin", "crossOrigin"),
    // presentation attributes
    ("accent-height", "accentHeight"),
    ("alignment-baseline", "alignmentBaseline"),
    ("arabic-form", "arabicForm"),
    ("baseline-shift", "baselineShift"),
    ("cap-height", "capHeight"),
    ("clip-path", "clipPath"),
    ("clip-rule", "clipRule"),
    ("color-interpolation", "colorInterpolation"),
    ("color-interpolation-filters", "colorInterpolationFilters"),
    ("color-profile", "colorProfile"),
    ("color-rendering", "colorRendering"),
    ("dominant-baseline", "dominantBaseline"),
    ("enable-background", "enableBackground"),
    ("fill-opacity", "fillOpacity"),
    ("fill-rule", "fillRule"),
    ("flood-color", "floodColor"),
    ("flood-opacity", "floodOpacity"),
    ("font-family", "fontFamily"),
    ("font-size", "fontSize"),
    ("font-size-adjust", "fontSizeAdjust"),
    ("font-stretch", "fontStretch"),
    ("font-style", "fontStyle"),
    ("font-variant", "fontVariant"),
    ("font-weight", "fontWeight"),
    ("glyph-name", "glyphName"),
    ("glyph-orientation-horizontal", "glyphOrientationHorizontal"),
    ("glyph-orientation-vertical", "glyphOrientationVertical"),
    ("horiz-adv-x", "horizAdvX"),
    ("horiz-origin-x", "horizOriginX"),
    ("image-rendering", "imageRendering"),
    ("letter-spacing", "letterSpacing"),
    ("lighting-color", "lightingColor"),
    ("marker-end", "markerEnd"),
    ("marker-mid", "markerMid"),
    ("marker-start", "markerStart"),
    ("overline-position", "overlinePosition"),
    ("overline-thickness", "overlineThickness"),
    ("paint-order", "paintOrder"),
    ("panose-1", "panose1"),
    ("pointer-events", "pointerEvents"),
    ("rendering-intent", "renderingIntent"),
    ("shape-rendering", "shapeRendering"),
    ("stop-color", "stopColor"),
    ("stop-opacity", "stopOpacity"),
    ("strikethrough-position", "strikethroughPosition"),
    ("strikethrough-thickness", "strikethroughThickness"),
    ("stroke-dasharray", "strokeDasharray"),
    ("stroke-dashoffset", "strokeDashoffset"),
    ("stroke-linecap", "strokeLinecap"),
    ("stroke-linejoin", "strokeLinejoin"),
    ("stroke-miterlimit", "strokeMiterlimit"),
    ("stroke-opacity", "strokeOpacity"),
    ("stroke-width", "strokeWidth"),
    ("text-anchor", "textAnchor"),
    ("text-decoration", "textDecoration"),
    ("text-rendering", "textRendering"),
    ("underline-position", "underlinePosition"),
    ("underline-thickness", "underlineThickness"),
    ("unicode-bidi", "unicodeBidi"),
    ("unicode-range", "unicodeRange"),
    ("units-per-em", "unitsPerEm"),
    ("v-alphabetic", "vAlphabetic"),
    ("v-hanging", "vHanging"),
    ("v-ideographic", "vIdeographic"),
    ("v-mathematical", "vMathematical"),
    ("vector-effect", "vectorEffect"),
    ("vert-adv-y", "vertAdvY"),
    ("vert-origin-x", "vertOriginX"),
    ("vert-origin-y", "vertOriginY"),
    ("word-spacing", "wordSpacing"),
    ("writing-mode", "writingMode"),
    ("x-height", "xHeight"),
];

static ATTRIBUTE_LOOKUP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| ATTRIBUTE_NAMES.iter().copied().collect());

/// React prop name for an SVG attribute name. The lookup ignores case.
pub fn prop_name(attr_name: &str) -> &str {
    ATTRIBUTE_LOOKUP
        .get(attr_name.to_lowercase().as_str())
        .copied()
        .unwrap_or(attr_name)
}

/// Convert the parsed markup tree into an element tree with classified props.
pub fn transform_tree(root: &MarkupNode, config: &ResolvedConfig) -> ElementNode {
    let mut element = transform_element(root, &config.replace_attr_values);
    element.is_root = true;
    element
}

fn transform_element(node: &MarkupNode, replacements: &IndexMap<String, String>) -> ElementNode {
    let props = node
        .attributes
        .iter()
        .map(|attr| {
            let value = replace_value(classify_value(&attr.name, &attr.value), replacements);
            Prop::attribute(prop_name(&attr.name), value)
        })
        .collect();

    let children = node
        .children
        .iter()
        .filter_map(|child| match child {
            MarkupChild::Element(e) => Some(ElementChild::Element(transform_element(e, replacements))),
            MarkupChild::Text(t) if t.trim().is_empty() => None,
            MarkupChild::Text(t) => Some(ElementChild::Expression(Expression::StringLiteral(t.clone()))),
        })
        .collect();

    ElementNode {
        tag: node.tag.clone(),
        props,
        children,
        is_root: false,
        injected: false,
    }
}

/// Decide how a raw attribute value is represented in the element tree.
pub fn classify_value(attr_name: &str, raw: &str) -> AttributeValue {
    if let Some(body) = expression_body(raw) {
        return AttributeValue::Expression(body.to_string());
    }
    if attr_name == "style" {
        return AttributeValue::Style(parse_style(raw));
    }
    if let Some(n) = parse_number(raw) {
        return AttributeValue::Number(n);
    }
    AttributeValue::String(LINE_BREAKS.replace_all(raw, " ").into_owned())
}

/// `replaceAttrValues`: only string values that match a key exactly are touched.
fn replace_value(value: AttributeValue, replacements: &IndexMap<String, String>) -> AttributeValue {
    if let AttributeValue::String(current) = &value {
        if let Some(substitute) = replacements.get(current) {
            return match expression_body(substitute) {
                Some(body) => AttributeValue::Expression(body.to_string()),
                None => AttributeValue::String(substitute.clone()),
            };
        }
    }
    value
}

/// Inner text of a value wrapped in exactly one outer pair of braces.
fn expression_body(raw: &str) -> Option<&str> {
    let inner = raw.strip_prefix('{')?.strip_suffix('}')?;
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0 && !inner.trim().is_empty()).then_some(inner)
}

fn parse_number(raw: &str) -> Option<f64> {
    if NUMERIC.is_match(raw) {
        raw.parse().ok()
    } else {
        None
    }
}

/// Parse a `key: value; key: value` declaration list.
pub fn parse_style(raw: &str) -> Vec<(String, StyleValue)> {
    raw.split(';')
        .filter_map(|entry| {
            let (key, value) = entry.split_once(':')?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return None;
            }
            let value = match parse_number(value) {
                Some(n) => StyleValue::Number(n),
                None => StyleValue::String(value.to_string()),
            };
            Some((style_key(key), value))
        })
        .collect()
}

fn style_key(key: &str) -> String {
    if key.starts_with("--") {
        return key.to_string();
    }
    let mut key = key.to_lowercase();
    if key.starts_with("-ms-") {
        key.remove(0);
    }
    HYPHENATED
        .replace_all(&key, |caps: &regex::Captures| caps[1].to_uppercase())
        .into_owned()
}
