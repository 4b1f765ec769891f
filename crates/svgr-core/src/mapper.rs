//! Config-driven rewrites of the element tree. Each pass takes the tree by
//! value and hands back the rewritten tree; they run in a fixed order since
//! later passes read what earlier ones produced.

use crate::ast::*;
use crate::attributes::classify_value;
use crate::config::{Dimension, DimensionPolicy, ResolvedConfig, SpreadPosition};
use crate::error::SvgrError;
use once_cell::sync::Lazy;
use std::collections::HashMap;

type Pass = fn(ElementNode, &ResolvedConfig) -> Result<ElementNode, SvgrError>;

const PASSES: &[(&str, Pass)] = &[
    ("dimensions", apply_dimensions),
    ("svg-props", merge_svg_props),
    ("ref", forward_ref),
    ("title-desc", inject_title_and_desc),
    ("expand-props", expand_props),
    ("native", remap_native),
];

/// SVG tag → react-native-svg component.
const NATIVE_COMPONENTS: &[(&str, &str)] = &[
    ("svg", "Svg"),
    ("circle", "Circle"),
    ("clipPath", "ClipPath"),
    ("defs", "Defs"),
    ("ellipse", "Ellipse"),
    ("feBlend", "FeBlend"),
    ("feColorMatrix", "FeColorMatrix"),
    ("feComponentTransfer", "FeComponentTransfer"),
    ("feComposite", "FeComposite"),
    ("feConvolveMatrix", "FeConvolveMatrix"),
    ("feDiffuseLighting", "FeDiffuseLighting"),
    ("feDisplacementMap", "FeDisplacementMap"),
    ("feDistantLight", "FeDistantLight"),
    ("feDropShadow", "FeDropShadow"),
    ("feFlood", "FeFlood"),
    ("feFuncA", "FeFuncA"),
    ("feFuncB", "FeFuncB"),
    ("feFuncG", "FeFuncG"),
    ("feFuncR", "FeFuncR"),
    ("feGaussianBlur", "FeGaussianBlur"),
    ("feImage", "FeImage"),
    ("feMerge", "FeMerge"),
    ("feMergeNode", "FeMergeNode"),
    ("feMorphology", "FeMorphology"),
    ("feOffset", "FeOffset"),
    ("fePointLight", "FePointLight"),
    ("feSpecularLighting", "FeSpecularLighting"),
    ("feSpotLight", "FeSpotLight"),
    ("feTile", "FeTile"),
    ("feTurbulence", "FeTurbulence"),
    ("filter", "Filter"),
    ("foreignObject", "ForeignObject"),
    ("g", "G"),
    ("image", "Image"),
    ("line", "Line"),
    ("linearGradient", "LinearGradient"),
    ("marker", "Marker"),
    ("mask", "Mask"),
    ("path", "Path"),
    ("pattern", "Pattern"),
    ("polygon", "Polygon"),
    ("polyline", "Polyline"),
    ("radialGradient", "RadialGradient"),
    ("rect", "Rect"),
    ("stop", "Stop"),
    ("symbol", "Symbol"),
    ("text", "Text"),
    ("textPath", "TextPath"),
    ("tspan", "TSpan"),
    ("use", "Use"),
];

static NATIVE_LOOKUP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| NATIVE_COMPONENTS.iter().copied().collect());

/// Run every pass over the root element.
pub fn map_tree(root: ElementNode, config: &ResolvedConfig) -> Result<ElementNode, SvgrError> {
    PASSES.iter().try_fold(root, |tree, (name, pass)| {
        tracing::trace!(pass = *name, "Applying mapper pass");
        pass(tree, config)
    })
}

fn apply_dimensions(mut root: ElementNode, config: &ResolvedConfig) -> Result<ElementNode, SvgrError> {
    match &config.dimensions {
        DimensionPolicy::Keep => {}
        DimensionPolicy::Strip => {
            root.remove_prop("width");
            root.remove_prop("height");
        }
        DimensionPolicy::Icon(size) => {
            let value = match size {
                Dimension::Number(n) => AttributeValue::Number(*n),
                Dimension::String(s) => AttributeValue::String(s.clone()),
            };
            root.set_prop("width", value.clone());
            root.set_prop("height", value);
        }
    }
    Ok(root)
}

fn merge_svg_props(mut root: ElementNode, config: &ResolvedConfig) -> Result<ElementNode, SvgrError> {
    for (name, raw) in &config.svg_props {
        root.set_prop(name, classify_value(name, raw));
    }
    Ok(root)
}

fn forward_ref(mut root: ElementNode, config: &ResolvedConfig) -> Result<ElementNode, SvgrError> {
    if config.forward_ref {
        root.set_prop("ref", AttributeValue::Expression("ref".to_string()));
    }
    Ok(root)
}

fn inject_title_and_desc(mut root: ElementNode, config: &ResolvedConfig) -> Result<ElementNode, SvgrError> {
    if config.title_prop && root.child_elements("title").next().is_none() {
        root.children.insert(0, conditional_text("title", "titleId"));
    }
    if config.desc_prop && root.child_elements("desc").next().is_none() {
        let index = match root.children.first() {
            Some(first) if renders_tag(first, "title") => 1,
            _ => 0,
        };
        root.children.insert(index, conditional_text("desc", "descId"));
    }
    Ok(root)
}

/// `{title ? <title id={titleId}>{title}</title> : null}`
fn conditional_text(prop: &str, id_prop: &str) -> ElementChild {
    let mut element = ElementNode::new(prop);
    element.injected = true;
    element
        .props
        .push(Prop::attribute("id", AttributeValue::Expression(id_prop.to_string())));
    element
        .children
        .push(ElementChild::Expression(Expression::Identifier(prop.to_string())));
    ElementChild::Expression(Expression::Conditional {
        test: prop.to_string(),
        element: Box::new(element),
    })
}

fn renders_tag(child: &ElementChild, tag: &str) -> bool {
    match child {
        ElementChild::Element(e) => e.tag == tag,
        ElementChild::Expression(Expression::Conditional { element, .. }) => element.tag == tag,
        ElementChild::Expression(_) => false,
    }
}

fn expand_props(mut root: ElementNode, config: &ResolvedConfig) -> Result<ElementNode, SvgrError> {
    match config.expand_props {
        Some(SpreadPosition::Start) => root.props.insert(0, Prop::Spread),
        Some(SpreadPosition::End) => root.props.push(Prop::Spread),
        None => {}
    }
    Ok(root)
}

fn remap_native(root: ElementNode, config: &ResolvedConfig) -> Result<ElementNode, SvgrError> {
    if config.native {
        remap_element(root)
    } else {
        Ok(root)
    }
}

fn remap_element(mut node: ElementNode) -> Result<ElementNode, SvgrError> {
    node.tag = native_component(&node.tag)
        .ok_or_else(|| SvgrError::UnsupportedNativeElement { tag: node.tag.clone() })?
        .to_string();
    node.children = node
        .children
        .into_iter()
        .map(|child| match child {
            ElementChild::Element(e) => remap_element(e).map(ElementChild::Element),
            ElementChild::Expression(Expression::Conditional { test, element }) => {
                Ok(ElementChild::Expression(Expression::Conditional {
                    test,
                    element: Box::new(remap_element(*element)?),
                }))
            }
            other => Ok(other),
        })
        .collect::<Result<_, _>>()?;
    Ok(node)
}

pub fn native_component(tag: &str) -> Option<&'static str> {
    NATIVE_LOOKUP.get(tag).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::transform_tree;
    use crate::config::{Config, ExpandProps, Icon};
    use crate::parser::parse;
    use crate::tokenizer::tokenize;

    fn mapped(svg: &str, config: Config) -> Result<ElementNode, SvgrError> {
        let resolved = ResolvedConfig::resolve(&config)?;
        let root = parse(tokenize(svg).unwrap()).unwrap();
        map_tree(transform_tree(&root, &resolved), &resolved)
    }

    fn prop_names(node: &ElementNode) -> Vec<&str> {
        node.props
            .iter()
            .map(|p| p.name().unwrap_or("..."))
            .collect()
    }

    fn child_tags(node: &ElementNode) -> Vec<String> {
        node.children
            .iter()
            .map(|c| match c {
                ElementChild::Element(e) => e.tag.clone(),
                ElementChild::Expression(Expression::Conditional { element, .. }) => {
                    format!("?{}", element.tag)
                }
                ElementChild::Expression(_) => "{}".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_default_spreads_at_end() {
        let root = mapped(r#"<svg viewBox="0 0 24 24" width="24"/>"#, Config::default()).unwrap();
        assert_eq!(prop_names(&root), vec!["viewBox", "width", "..."]);
    }

    #[test]
    fn test_spread_at_start() {
        let config = Config {
            expand_props: ExpandProps::Start,
            ..Default::default()
        };
        let root = mapped(r#"<svg viewBox="0 0 24 24" width="24"/>"#, config).unwrap();
        assert_eq!(prop_names(&root), vec!["...", "viewBox", "width"]);
    }

    #[test]
    fn test_no_spread() {
        let config = Config {
            expand_props: ExpandProps::None,
            ..Default::default()
        };
        let root = mapped("<svg/>", config).unwrap();
        assert!(root.props.is_empty());
    }

    #[test]
    fn test_strip_dimensions() {
        let config = Config {
            dimensions: false,
            icon: Some(Icon::Bool(true)),
            expand_props: ExpandProps::None,
            ..Default::default()
        };
        let root = mapped(r#"<svg width="24" viewBox="0 0 24 24" height="24"><rect width="5" height="5"/></svg>"#, config).unwrap();
        assert_eq!(prop_names(&root), vec!["viewBox"]);
        let ElementChild::Element(rect) = &root.children[0] else {
            panic!("expected rect");
        };
        assert_eq!(prop_names(rect), vec!["width", "height"]);
    }

    #[test]
    fn test_icon_overwrites_in_place_and_appends() {
        let config = Config {
            icon: Some(Icon::Number(24.0)),
            expand_props: ExpandProps::None,
            ..Default::default()
        };
        let root = mapped(r#"<svg height="100" viewBox="0 0 100 100"/>"#, config).unwrap();
        assert_eq!(prop_names(&root), vec!["height", "viewBox", "width"]);
        assert_eq!(root.prop("height"), Some(&AttributeValue::Number(24.0)));
        assert_eq!(root.prop("width"), Some(&AttributeValue::Number(24.0)));
    }

    #[test]
    fn test_icon_string() {
        let config = Config {
            icon: Some(Icon::String("2em".to_string())),
            ..Default::default()
        };
        let root = mapped(r#"<svg width="100" height="100"/>"#, config).unwrap();
        assert_eq!(root.prop("width"), Some(&AttributeValue::String("2em".to_string())));
        assert_eq!(root.prop("height"), Some(&AttributeValue::String("2em".to_string())));
    }

    #[test]
    fn test_svg_props_merge() {
        let mut config = Config {
            expand_props: ExpandProps::None,
            ..Default::default()
        };
        config.svg_props.insert("role".to_string(), "img".to_string());
        config.svg_props.insert("width".to_string(), "{size}".to_string());
        config.svg_props.insert("focusable".to_string(), "false".to_string());
        let root = mapped(r#"<svg width="24"/>"#, config).unwrap();
        assert_eq!(prop_names(&root), vec!["width", "role", "focusable"]);
        assert_eq!(root.prop("width"), Some(&AttributeValue::Expression("size".to_string())));
        assert_eq!(root.prop("focusable"), Some(&AttributeValue::String("false".to_string())));
    }

    #[test]
    fn test_svg_props_style_expression() {
        let mut config = Config {
            expand_props: ExpandProps::None,
            ..Default::default()
        };
        config.svg_props.insert("style".to_string(), "{props.style}".to_string());
        let root = mapped(r#"<svg style="fill: red"/>"#, config).unwrap();
        assert_eq!(root.prop("style"), Some(&AttributeValue::Expression("props.style".to_string())));
    }

    #[test]
    fn test_svg_props_override_icon() {
        let mut config = Config {
            icon: Some(Icon::Bool(true)),
            ..Default::default()
        };
        config.svg_props.insert("width".to_string(), "48".to_string());
        let root = mapped("<svg/>", config).unwrap();
        assert_eq!(root.prop("width"), Some(&AttributeValue::Number(48.0)));
        assert_eq!(root.prop("height"), Some(&AttributeValue::String("1em".to_string())));
    }

    #[test]
    fn test_ref_before_spread() {
        let config = Config {
            r#ref: true,
            ..Default::default()
        };
        let root = mapped("<svg/>", config).unwrap();
        assert_eq!(prop_names(&root), vec!["ref", "..."]);
        assert_eq!(root.prop("ref"), Some(&AttributeValue::Expression("ref".to_string())));
    }

    #[test]
    fn test_title_and_desc_injected_in_order() {
        let config = Config {
            title_prop: true,
            desc_prop: true,
            ..Default::default()
        };
        let root = mapped("<svg><path/></svg>", config).unwrap();
        assert_eq!(child_tags(&root), vec!["?title", "?desc", "path"]);
        let ElementChild::Expression(Expression::Conditional { test, element }) = &root.children[0] else {
            panic!("expected conditional title");
        };
        assert_eq!(test, "title");
        assert!(element.injected);
        assert_eq!(element.prop("id"), Some(&AttributeValue::Expression("titleId".to_string())));
        assert_eq!(
            element.children,
            vec![ElementChild::Expression(Expression::Identifier("title".to_string()))]
        );
    }

    #[test]
    fn test_existing_title_is_untouched() {
        let config = Config {
            title_prop: true,
            ..Default::default()
        };
        let root = mapped("<svg><path/><title>Logo</title></svg>", config).unwrap();
        assert_eq!(child_tags(&root), vec!["path", "title"]);
    }

    #[test]
    fn test_desc_goes_first_when_title_exists_elsewhere() {
        let config = Config {
            title_prop: true,
            desc_prop: true,
            ..Default::default()
        };
        let root = mapped("<svg><path/><title>Logo</title></svg>", config).unwrap();
        assert_eq!(child_tags(&root), vec!["?desc", "path", "title"]);
    }

    #[test]
    fn test_desc_follows_existing_leading_title() {
        let config = Config {
            desc_prop: true,
            ..Default::default()
        };
        let root = mapped("<svg><title>Logo</title><path/></svg>", config).unwrap();
        assert_eq!(child_tags(&root), vec!["title", "?desc", "path"]);
    }

    #[test]
    fn test_native_remap() {
        let config = Config {
            native: true,
            ..Default::default()
        };
        let root = mapped(r#"<svg><g><path d="M0 0"/><tspan/></g><linearGradient/></svg>"#, config).unwrap();
        assert_eq!(root.tag, "Svg");
        assert_eq!(child_tags(&root), vec!["G", "LinearGradient"]);
        let ElementChild::Element(g) = &root.children[0] else {
            panic!("expected G");
        };
        assert_eq!(child_tags(g), vec!["Path", "TSpan"]);
    }

    #[test]
    fn test_native_unknown_tag() {
        let config = Config {
            native: true,
            ..Default::default()
        };
        let err = mapped("<svg><g><animate/></g></svg>", config).unwrap_err();
        assert_eq!(
            err,
            SvgrError::UnsupportedNativeElement {
                tag: "animate".to_string()
            }
        );
    }

    #[test]
    fn test_passes_are_deterministic() {
        let svg = r#"<svg viewBox="0 0 24 24"><path d="M0 0"/></svg>"#;
        let config = Config {
            icon: Some(Icon::Bool(true)),
            r#ref: true,
            title_prop: true,
            ..Default::default()
        };
        assert_eq!(mapped(svg, config.clone()).unwrap(), mapped(svg, config).unwrap());
    }
}
