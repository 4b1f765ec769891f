//! Trees produced by the pipeline: the parsed markup tree and the element
//! tree that the templater serializes.

/// A parsed SVG element. Children are owned; there are no back-references.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupNode {
    pub tag: String,
    pub attributes: Vec<MarkupAttribute>,
    pub children: Vec<MarkupChild>,
    pub self_closing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupAttribute {
    pub name: String,
    /// Decoded value; source quoting and entity escaping are already gone.
    pub value: String,
    /// Name carries a namespace prefix such as `xmlns:xlink`.
    pub namespaced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupChild {
    Element(MarkupNode),
    Text(String),
}

impl MarkupNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Rendered quoted: `fill="red"`.
    String(String),
    /// Rendered as an expression: `width={24}`.
    Number(f64),
    /// Target-language expression inserted verbatim: `fill={props.color}`.
    Expression(String),
    /// `style={{ fillOpacity: 0.5 }}`, entries in source order.
    Style(Vec<(String, StyleValue)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    String(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    Attribute { name: String, value: AttributeValue },
    /// `{...props}`
    Spread,
}

impl Prop {
    pub fn attribute(name: impl Into<String>, value: AttributeValue) -> Self {
        Prop::Attribute {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Prop::Attribute { name, .. } => Some(name),
            Prop::Spread => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: String,
    pub props: Vec<Prop>,
    pub children: Vec<ElementChild>,
    pub is_root: bool,
    /// Added by the pipeline rather than parsed from the source.
    pub injected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementChild {
    Element(ElementNode),
    /// Text and injected content both render inside `{...}`.
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `{"some text"}`
    StringLiteral(String),
    /// `{title}`
    Identifier(String),
    /// `{test ? <element/> : null}`
    Conditional {
        test: String,
        element: Box<ElementNode>,
    },
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: Vec::new(),
            children: Vec::new(),
            is_root: false,
            injected: false,
        }
    }

    pub fn prop(&self, name: &str) -> Option<&AttributeValue> {
        self.props.iter().find_map(|p| match p {
            Prop::Attribute { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    /// Replace a same-named prop in place, or append it.
    pub fn set_prop(&mut self, name: &str, value: AttributeValue) {
        for prop in self.props.iter_mut() {
            if let Prop::Attribute { name: n, value: v } = prop {
                if n == name {
                    *v = value;
                    return;
                }
            }
        }
        self.props.push(Prop::attribute(name, value));
    }

    pub fn remove_prop(&mut self, name: &str) {
        self.props.retain(|p| p.name() != Some(name));
    }

    /// Direct child elements with the given tag.
    pub fn child_elements<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ElementNode> + 'a {
        self.children.iter().filter_map(move |c| match c {
            ElementChild::Element(e) if e.tag == tag => Some(e),
            _ => None,
        })
    }
}
