//! `X.createElement(type, props, ...children)` → JSX.
//!
//! Every call expression in the module is tested on its own, children before
//! parents, so nested element calls are rewritten regardless of depth. Calls
//! whose shape cannot be read confidently are left exactly as they were.

use std::fmt;

use swc_core::{
    common::{Span, SyntaxContext, DUMMY_SP},
    ecma::{
        ast::*,
        visit::{Visit, VisitMut, VisitMutWith, VisitWith},
    },
};

use crate::config::{Config, ReceiverPolicy};
use crate::error::Result;
use crate::matching::{create_element_receiver, expr_kind, unparen};
use crate::syntax;

// -----------------------------------------------------------------------------
// Call shape
// -----------------------------------------------------------------------------

/// Borrowed view of a call that looks like `<Ident>.createElement(...)`.
pub struct CallShape<'a> {
    pub receiver: &'a str,
    pub type_arg: &'a ExprOrSpread,
    pub props_arg: Option<&'a ExprOrSpread>,
    pub child_args: &'a [ExprOrSpread],
}

impl<'a> CallShape<'a> {
    /// `None` unless the callee is `<Ident>.createElement`, the receiver is
    /// accepted by `policy` and there is at least one argument.
    pub fn of(call: &'a CallExpr, policy: &ReceiverPolicy) -> Option<Self> {
        let receiver = create_element_receiver(&call.callee)?;
        if !policy.accepts(receiver) {
            return None;
        }
        let (type_arg, rest) = call.args.split_first()?;
        let (props_arg, child_args) = match rest.split_first() {
            Some((props, children)) => (Some(props), children),
            None => (None, rest),
        };
        Some(CallShape {
            receiver,
            type_arg,
            props_arg,
            child_args,
        })
    }

    /// Decide the tag, or why this call has to stay a call.
    pub fn tag(&self) -> Result<TagName, SkipReason> {
        if self.type_arg.spread.is_some() {
            return Err(SkipReason::SpreadType);
        }
        // can't tell where props end and children start
        if self.props_arg.is_some_and(|p| p.spread.is_some()) {
            return Err(SkipReason::SpreadProps);
        }
        match unparen(&self.type_arg.expr) {
            Expr::Ident(i) => Ok(TagName::Ident(i.sym.to_string())),
            Expr::Lit(Lit::Str(s)) => {
                let value = s.value.to_string();
                if is_jsx_tag_name(&value) {
                    Ok(TagName::Str(value))
                } else {
                    Err(SkipReason::InvalidTagName(value))
                }
            }
            other => Err(SkipReason::UnsupportedType(expr_kind(other))),
        }
    }
}

// `name`, `my-el`, or one `ns:name` pair
fn is_jsx_tag_name(s: &str) -> bool {
    match s.split_once(':') {
        Some((ns, name)) => is_jsx_name_part(ns) && is_jsx_name_part(name),
        None => is_jsx_name_part(s),
    }
}

fn is_jsx_name_part(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '-'))
}

/// Why a matching call was left untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    SpreadType,
    SpreadProps,
    InvalidTagName(String),
    UnsupportedType(&'static str),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SpreadType => f.write_str("element type is a spread argument"),
            SkipReason::SpreadProps => f.write_str("props are a spread argument"),
            SkipReason::InvalidTagName(name) => write!(f, "{name:?} is not a valid JSX tag name"),
            SkipReason::UnsupportedType(kind) => write!(f, "element type is a {kind}"),
        }
    }
}

// -----------------------------------------------------------------------------
// Element descriptor
// -----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagName {
    /// Component reference: `createElement(Button, ...)`.
    Ident(String),
    /// Native or computed string tag: `createElement("div", ...)`.
    Str(String),
}

impl TagName {
    pub fn as_str(&self) -> &str {
        match self {
            TagName::Ident(s) | TagName::Str(s) => s,
        }
    }

    fn to_jsx(&self) -> JSXElementName {
        JSXElementName::Ident(Ident::new(self.as_str().into(), DUMMY_SP, SyntaxContext::empty()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Text(String),
    Expr(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

impl Attribute {
    fn from_value(name: String, value: Box<Expr>, rules: TextRules) -> Self {
        let text = match unparen(&value) {
            Expr::Lit(Lit::Str(s)) if rules.attr_text_safe(&s.value) => Some(s.value.to_string()),
            _ => None,
        };
        let value = match text {
            Some(t) => AttrValue::Text(t),
            None => AttrValue::Expr(value),
        };
        Attribute { name, value }
    }

    fn into_jsx(self) -> JSXAttrOrSpread {
        let value = match self.value {
            AttrValue::Text(s) => JSXAttrValue::Lit(Lit::Str(Str {
                span: DUMMY_SP,
                value: s.into(),
                raw: None,
            })),
            AttrValue::Expr(expr) => JSXAttrValue::JSXExprContainer(JSXExprContainer {
                span: DUMMY_SP,
                expr: JSXExpr::Expr(expr),
            }),
        };
        JSXAttrOrSpread::JSXAttr(JSXAttr {
            span: DUMMY_SP,
            name: JSXAttrName::Ident(IdentName::new(self.name.into(), DUMMY_SP)),
            value: Some(value),
        })
    }
}

/// Which string literals may be written as bare JSX text or attribute
/// strings. Anything else stays a `{"..."}` expression, where the printer's
/// JS escapes keep their meaning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextRules {
    /// The printer escapes non-ASCII in string literals but writes JSX text
    /// verbatim, so non-ASCII literals stay expressions.
    pub ascii_only: bool,
}

impl TextRules {
    pub fn new(config: &Config) -> Self {
        Self {
            ascii_only: config.format.ascii_only,
        }
    }

    // JSX attribute strings have no escapes and decode entities
    fn attr_text_safe(self, s: &str) -> bool {
        !s.contains(['\\', '&'])
            && !s.chars().any(|c| c.is_control() || is_line_separator(c))
            && !(s.contains('"') && s.contains('\''))
            && self.charset_ok(s)
    }

    // JSX text would reinterpret braces, tags, entities and line breaks
    fn jsx_text_safe(self, s: &str) -> bool {
        !s.is_empty()
            && !s.contains(['{', '}', '<', '>', '&', '\n', '\r'])
            && !s.chars().any(is_line_separator)
            && self.charset_ok(s)
    }

    fn charset_ok(self, s: &str) -> bool {
        !self.ascii_only || s.is_ascii()
    }
}

fn is_line_separator(c: char) -> bool {
    matches!(c, '\u{2028}' | '\u{2029}')
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChildDescriptor {
    Text(String),
    Expression(Box<Expr>),
    /// `...expr`; rendered as `{expr}`, the spread itself is dropped.
    Spread(Box<Expr>),
}

impl ChildDescriptor {
    fn from_arg(arg: ExprOrSpread, rules: TextRules) -> Self {
        if arg.spread.is_some() {
            return ChildDescriptor::Spread(arg.expr);
        }
        let text = match unparen(&arg.expr) {
            Expr::Lit(Lit::Str(s)) if rules.jsx_text_safe(&s.value) => Some(s.value.to_string()),
            _ => None,
        };
        match text {
            Some(t) => ChildDescriptor::Text(t),
            None => ChildDescriptor::Expression(arg.expr),
        }
    }

    fn into_jsx(self) -> JSXElementChild {
        match self {
            ChildDescriptor::Text(t) => JSXElementChild::JSXText(JSXText {
                span: DUMMY_SP,
                value: t.clone().into(),
                raw: t.into(),
            }),
            ChildDescriptor::Expression(expr) | ChildDescriptor::Spread(expr) => {
                JSXElementChild::JSXExprContainer(JSXExprContainer {
                    span: DUMMY_SP,
                    expr: JSXExpr::Expr(expr),
                })
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElementDescriptor {
    pub tag: TagName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<ChildDescriptor>,
    pub self_closing: bool,
}

impl ElementDescriptor {
    /// Build from the full argument list of an accepted call; the first
    /// argument is the type and has already been turned into `tag`.
    pub fn from_args(tag: TagName, args: Vec<ExprOrSpread>, rules: TextRules) -> Self {
        let mut args = args.into_iter().skip(1);
        let attributes = match args.next() {
            Some(ExprOrSpread { spread: None, expr }) => attributes_from_props(expr, rules),
            _ => vec![],
        };
        let children: Vec<_> = args.map(|arg| ChildDescriptor::from_arg(arg, rules)).collect();
        ElementDescriptor {
            tag,
            attributes,
            self_closing: children.is_empty(),
            children,
        }
    }

    pub fn into_jsx(self, span: Span) -> JSXElement {
        let name = self.tag.to_jsx();
        JSXElement {
            span,
            opening: JSXOpeningElement {
                name: name.clone(),
                span: DUMMY_SP,
                attrs: self.attributes.into_iter().map(Attribute::into_jsx).collect(),
                self_closing: self.self_closing,
                type_args: None,
            },
            children: self.children.into_iter().map(ChildDescriptor::into_jsx).collect(),
            closing: (!self.self_closing).then(|| JSXClosingElement {
                span: DUMMY_SP,
                name,
            }),
        }
    }
}

/// Only object literals produce attributes. Keys that are not plain
/// identifiers, spreads, methods and accessors are dropped.
fn attributes_from_props(props: Box<Expr>, rules: TextRules) -> Vec<Attribute> {
    let obj = match *props {
        Expr::Object(obj) => obj,
        Expr::Paren(p) => return attributes_from_props(p.expr, rules),
        _ => return vec![],
    };
    let mut out = Vec::with_capacity(obj.props.len());
    for prop in obj.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        match *prop {
            Prop::KeyValue(KeyValueProp {
                key: PropName::Ident(key),
                value,
            }) => out.push(Attribute::from_value(key.sym.to_string(), value, rules)),
            Prop::Shorthand(ident) => out.push(Attribute {
                name: ident.sym.to_string(),
                value: AttrValue::Expr(Box::new(Expr::Ident(ident))),
            }),
            _ => {}
        }
    }
    out
}

// -----------------------------------------------------------------------------
// Rewrite pass
// -----------------------------------------------------------------------------

enum Outcome {
    NotCreateElement,
    Skipped(SkipReason),
    Element(JSXElement),
}

fn reconstruct_call(call: &mut CallExpr, policy: &ReceiverPolicy, rules: TextRules) -> Outcome {
    let tag = match CallShape::of(call, policy) {
        None => return Outcome::NotCreateElement,
        Some(shape) => match shape.tag() {
            Ok(tag) => tag,
            Err(reason) => return Outcome::Skipped(reason),
        },
    };
    let args = std::mem::take(&mut call.args);
    Outcome::Element(ElementDescriptor::from_args(tag, args, rules).into_jsx(call.span))
}

pub struct JsxReconstructor<'a> {
    policy: &'a ReceiverPolicy,
    rules: TextRules,
    pub converted: usize,
    pub skipped: usize,
}

impl<'a> JsxReconstructor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            policy: &config.receiver,
            rules: TextRules::new(config),
            converted: 0,
            skipped: 0,
        }
    }
}

impl VisitMut for JsxReconstructor<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        let Expr::Call(call) = expr else {
            return;
        };
        match reconstruct_call(call, self.policy, self.rules) {
            Outcome::NotCreateElement => {}
            Outcome::Skipped(reason) => {
                self.skipped += 1;
                tracing::debug!(%reason, "leaving createElement call as is");
            }
            Outcome::Element(element) => {
                self.converted += 1;
                *expr = Expr::JSXElement(Box::new(element));
            }
        }
    }
}

/// Count calls that still match the createElement shape under `policy`.
pub fn count_matching_calls(module: &Module, policy: &ReceiverPolicy) -> usize {
    struct Counter<'a> {
        policy: &'a ReceiverPolicy,
        n: usize,
    }
    impl Visit for Counter<'_> {
        fn visit_call_expr(&mut self, call: &CallExpr) {
            if CallShape::of(call, self.policy).is_some() {
                self.n += 1;
            }
            call.visit_children_with(self);
        }
    }
    let mut counter = Counter { policy, n: 0 };
    module.visit_with(&mut counter);
    counter.n
}

// -----------------------------------------------------------------------------
// Entry points
// -----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconstruction {
    pub code: String,
    pub converted: usize,
    pub skipped: usize,
}

/// Rewrite every reconstructible call in `module` in place.
/// Returns `(converted, skipped)`.
pub fn reconstruct_module(module: &mut Module, config: &Config) -> (usize, usize) {
    let mut pass = JsxReconstructor::new(config);
    module.visit_mut_with(&mut pass);
    (pass.converted, pass.skipped)
}

/// When nothing was converted the input comes back byte-for-byte.
pub fn reconstruct_jsx_with(source: &str, config: &Config) -> Result<Reconstruction> {
    let mut parsed = syntax::parse(source, config.dialect)?;
    let (converted, skipped) = reconstruct_module(&mut parsed.module, config);
    tracing::debug!(converted, skipped, "reconstructed createElement calls");

    let code = if converted == 0 {
        source.to_string()
    } else {
        syntax::print(&parsed, &config.format)?
    };
    Ok(Reconstruction {
        code,
        converted,
        skipped,
    })
}

pub fn reconstruct_jsx(source: &str) -> Result<String> {
    Ok(reconstruct_jsx_with(source, &Config::default())?.code)
}
