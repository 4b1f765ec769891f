//! Element tree → component module source: imports, optional props
//! interface, the component declaration, wrapper HOCs and the export.

use crate::ast::*;
use crate::config::{ExportType, JsxRuntimeImport, ResolvedConfig};
use crate::state::ComponentState;
use std::collections::BTreeSet;

const NATIVE_SOURCE: &str = "react-native-svg";

#[derive(Debug, Clone, PartialEq)]
enum ImportKind {
    Namespace(String),
    Specifiers {
        default: Option<String>,
        named: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Import {
    source: String,
    kind: ImportKind,
}

/// Import statements in emission order.
#[derive(Debug, Default)]
struct Imports(Vec<Import>);

impl Imports {
    fn push_runtime(&mut self, runtime: &JsxRuntimeImport) {
        let kind = if let Some(namespace) = &runtime.namespace {
            ImportKind::Namespace(namespace.clone())
        } else if let Some(default) = &runtime.default_specifier {
            ImportKind::Specifiers {
                default: Some(default.clone()),
                named: Vec::new(),
            }
        } else {
            ImportKind::Specifiers {
                default: None,
                named: runtime.specifiers.clone().unwrap_or_default(),
            }
        };
        self.0.push(Import {
            source: runtime.source.clone(),
            kind,
        });
    }

    /// Add a named specifier to the first non-namespace import of `source`,
    /// or start a new import for it.
    fn named(&mut self, source: &str, name: &str) {
        for import in self.0.iter_mut().filter(|i| i.source == source) {
            if let ImportKind::Specifiers { named, .. } = &mut import.kind {
                if !named.iter().any(|n| n == name) {
                    named.push(name.to_string());
                }
                return;
            }
        }
        self.0.push(Import {
            source: source.to_string(),
            kind: ImportKind::Specifiers {
                default: None,
                named: vec![name.to_string()],
            },
        });
    }

    fn render(&self, out: &mut String) {
        for import in &self.0 {
            out.push_str("import ");
            match &import.kind {
                ImportKind::Namespace(ns) => {
                    out.push_str("* as ");
                    out.push_str(ns);
                }
                ImportKind::Specifiers { default, named } => {
                    if let Some(default) = default {
                        out.push_str(default);
                        if !named.is_empty() {
                            out.push_str(", ");
                        }
                    }
                    if !named.is_empty() {
                        out.push_str("{ ");
                        out.push_str(&named.join(", "));
                        out.push_str(" }");
                    }
                }
            }
            out.push_str(" from ");
            out.push_str(&quote(&import.source));
            out.push_str(";\n");
        }
    }
}

/// Render the complete module for the mapped tree.
pub fn render_component(tree: &ElementNode, config: &ResolvedConfig, state: &ComponentState) -> String {
    let helpers = config.runtime.import_source.as_str();
    let mut imports = Imports::default();
    let mut params: Vec<String> = Vec::new();
    let mut interface: Vec<&str> = Vec::new();

    if let Some(runtime) = &config.runtime.import {
        imports.push_runtime(runtime);
    }

    if config.native {
        let mut used = BTreeSet::new();
        collect_tags(tree, &mut used);
        for tag in used {
            imports.named(NATIVE_SOURCE, &tag);
        }
    }

    if config.title_prop {
        interface.extend(["title", "titleId"]);
    }
    if config.desc_prop {
        interface.extend(["desc", "descId"]);
    }

    let svg_props_type = |imports: &mut Imports| {
        if config.native {
            imports.named(NATIVE_SOURCE, "SvgProps");
            "SvgProps".to_string()
        } else {
            imports.named(helpers, "SVGProps");
            "SVGProps<SVGSVGElement>".to_string()
        }
    };

    let expand = config.expand_props.is_some();
    if !interface.is_empty() {
        let mut fields = interface.join(", ");
        if expand {
            fields.push_str(", ...props");
        }
        let mut param = format!("{{ {fields} }}");
        if config.typescript {
            param.push_str(": ");
            if expand {
                param.push_str(&svg_props_type(&mut imports));
                param.push_str(" & ");
            }
            param.push_str("SVGRProps");
        }
        params.push(param);
    } else if expand {
        let mut param = "props".to_string();
        if config.typescript {
            param.push_str(": ");
            param.push_str(&svg_props_type(&mut imports));
        }
        params.push(param);
    }

    let mut export_name = state.component_name.clone();
    let mut hocs = String::new();

    if config.forward_ref {
        if params.is_empty() {
            params.push("_".to_string());
        }
        if config.typescript {
            imports.named(helpers, "Ref");
            params.push("ref: Ref<SVGSVGElement>".to_string());
        } else {
            params.push("ref".to_string());
        }
        imports.named(helpers, "forwardRef");
        push_hoc(&mut hocs, "ForwardRef", "forwardRef", &export_name);
        export_name = "ForwardRef".to_string();
    }

    if config.memo {
        imports.named(helpers, "memo");
        push_hoc(&mut hocs, "Memo", "memo", &export_name);
        export_name = "Memo".to_string();
    }

    let mut out = String::new();
    imports.render(&mut out);

    if config.typescript && !interface.is_empty() {
        out.push_str("interface SVGRProps {\n");
        for field in &interface {
            out.push_str("  ");
            out.push_str(field);
            out.push_str("?: string;\n");
        }
        out.push_str("}\n");
    }

    out.push_str("const ");
    out.push_str(&state.component_name);
    out.push_str(" = (");
    out.push_str(&params.join(", "));
    out.push_str(") => ");
    render_element(tree, &mut out);
    out.push_str(";\n");
    out.push_str(&hocs);

    let previous_export = state.previous_export();
    if config.export_type == ExportType::Named || previous_export.is_some() {
        out.push_str("export { ");
        out.push_str(&export_name);
        out.push_str(" as ");
        out.push_str(&config.named_export);
        out.push_str(" };\n");
        if let Some(previous) = previous_export {
            out.push_str(previous.trim_end());
            out.push('\n');
        }
    } else {
        out.push_str("export default ");
        out.push_str(&export_name);
        out.push_str(";\n");
    }

    out
}

fn push_hoc(out: &mut String, name: &str, callee: &str, wrapped: &str) {
    out.push_str(&format!("const {name} = {callee}({wrapped});\n"));
}

fn collect_tags(node: &ElementNode, tags: &mut BTreeSet<String>) {
    tags.insert(node.tag.clone());
    for child in &node.children {
        match child {
            ElementChild::Element(e) => collect_tags(e, tags),
            ElementChild::Expression(Expression::Conditional { element, .. }) => collect_tags(element, tags),
            ElementChild::Expression(_) => {}
        }
    }
}

/// Serialize an element and its subtree as JSX on a single line.
pub fn render_element(node: &ElementNode, out: &mut String) {
    out.push('<');
    out.push_str(&node.tag);
    for prop in &node.props {
        out.push(' ');
        render_prop(prop, out);
    }

    if node.children.is_empty() {
        out.push_str(" />");
        return;
    }

    out.push('>');
    for child in &node.children {
        match child {
            ElementChild::Element(e) => render_element(e, out),
            ElementChild::Expression(expr) => {
                out.push('{');
                render_expression(expr, out);
                out.push('}');
            }
        }
    }
    out.push_str("</");
    out.push_str(&node.tag);
    out.push('>');
}

fn render_expression(expr: &Expression, out: &mut String) {
    match expr {
        Expression::StringLiteral(s) => out.push_str(&quote(s)),
        Expression::Identifier(name) => out.push_str(name),
        Expression::Conditional { test, element } => {
            out.push_str(test);
            out.push_str(" ? ");
            render_element(element, out);
            out.push_str(" : null");
        }
    }
}

fn render_prop(prop: &Prop, out: &mut String) {
    let (name, value) = match prop {
        Prop::Spread => {
            out.push_str("{...props}");
            return;
        }
        Prop::Attribute { name, value } => (name, value),
    };

    out.push_str(name);
    out.push('=');
    match value {
        AttributeValue::String(s) if needs_expression_container(s) => {
            out.push('{');
            out.push_str(&quote(s));
            out.push('}');
        }
        AttributeValue::String(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        AttributeValue::Number(n) => out.push_str(&format!("{{{n}}}")),
        AttributeValue::Expression(e) => {
            out.push('{');
            out.push_str(e);
            out.push('}');
        }
        AttributeValue::Style(entries) => {
            if entries.is_empty() {
                out.push_str("{{}}");
                return;
            }
            let body: Vec<String> = entries
                .iter()
                .map(|(key, value)| {
                    let key = if is_identifier(key) { key.clone() } else { quote(key) };
                    let value = match value {
                        StyleValue::Number(n) => n.to_string(),
                        StyleValue::String(s) => quote(s),
                    };
                    format!("{key}: {value}")
                })
                .collect();
            out.push_str("{{ ");
            out.push_str(&body.join(", "));
            out.push_str(" }}");
        }
    }
}

/// JSX attribute strings have no escapes and decode entities, so anything
/// that would change meaning goes through a JS string literal instead.
fn needs_expression_container(s: &str) -> bool {
    s.contains(['"', '\\', '&', '\n'])
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Double-quoted JS string literal.
fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}
