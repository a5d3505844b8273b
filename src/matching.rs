//! Small shape predicates over swc expressions shared by both passes.

use swc_core::ecma::ast::*;

/// Strip any number of wrapping parentheses.
pub(crate) fn unparen(mut expr: &Expr) -> &Expr {
    while let Expr::Paren(p) = expr {
        expr = &p.expr;
    }
    expr
}

pub(crate) fn is_ident(expr: &Expr, name: &str) -> bool {
    matches!(unparen(expr), Expr::Ident(i) if i.sym.as_ref() == name)
}

/// `obj.prop` with both sides plain identifiers.
pub(crate) fn is_member(expr: &Expr, obj: &str, prop: &str) -> bool {
    match unparen(expr) {
        Expr::Member(m) => {
            is_ident(&m.obj, obj) && matches!(&m.prop, MemberProp::Ident(p) if p.sym.as_ref() == prop)
        }
        _ => false,
    }
}

/// Value of a string literal or of a template literal without substitutions.
pub(crate) fn static_string(expr: &Expr) -> Option<String> {
    match unparen(expr) {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        Expr::Tpl(t) if t.exprs.is_empty() => t
            .quasis
            .first()
            .and_then(|q| q.cooked.as_ref())
            .map(|c| c.to_string()),
        _ => None,
    }
}

/// Collect the literal text pieces of a string-building expression such as
/// `'Calling `require` for "' + e + '"'` or a template literal.
pub(crate) fn literal_fragments(expr: &Expr, out: &mut Vec<String>) {
    match unparen(expr) {
        Expr::Lit(Lit::Str(s)) => out.push(s.value.to_string()),
        Expr::Tpl(t) => out.extend(
            t.quasis
                .iter()
                .filter_map(|q| q.cooked.as_ref().map(|c| c.to_string())),
        ),
        Expr::Bin(b) if b.op == BinaryOp::Add => {
            literal_fragments(&b.left, out);
            literal_fragments(&b.right, out);
        }
        _ => {}
    }
}

pub(crate) fn prop_name_is(key: &PropName, name: &str) -> bool {
    match key {
        PropName::Ident(i) => i.sym.as_ref() == name,
        PropName::Str(s) => s.value.as_ref() == name,
        _ => false,
    }
}

/// Receiver of a `<Identifier>.createElement` callee.
pub(crate) fn create_element_receiver(callee: &Callee) -> Option<&str> {
    let Callee::Expr(expr) = callee else {
        return None;
    };
    let Expr::Member(m) = &**expr else {
        return None;
    };
    match (&*m.obj, &m.prop) {
        (Expr::Ident(receiver), MemberProp::Ident(prop)) if prop.sym.as_ref() == "createElement" => {
            Some(receiver.sym.as_ref())
        }
        _ => None,
    }
}

/// Short human label for log lines.
pub(crate) fn expr_kind(expr: &Expr) -> &'static str {
    match unparen(expr) {
        Expr::Member(_) | Expr::OptChain(_) => "member expression",
        Expr::Call(_) | Expr::New(_) => "call expression",
        Expr::Cond(_) => "conditional expression",
        Expr::Lit(_) => "non-string literal",
        Expr::Tpl(_) => "template literal",
        Expr::Fn(_) | Expr::Arrow(_) | Expr::Class(_) => "inline function or class",
        Expr::Bin(_) | Expr::Unary(_) => "operator expression",
        _ => "expression",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Dialect;
    use crate::syntax::parse;

    fn expr_of(src: &str) -> Box<Expr> {
        let parsed = parse(&format!("({src});"), Dialect::Jsx).unwrap();
        match parsed.module.body.into_iter().next() {
            Some(ModuleItem::Stmt(Stmt::Expr(e))) => e.expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn fragments_walk_concatenation_and_templates() {
        let mut out = vec![];
        literal_fragments(&expr_of(r#"'Calling `require` for "' + e + '" failed'"#), &mut out);
        assert_eq!(out, vec!["Calling `require` for \"", "\" failed"]);

        let mut out = vec![];
        literal_fragments(&expr_of(r#"`a${b}c`"#), &mut out);
        assert_eq!(out, vec!["a", "c"]);
    }

    #[test]
    fn static_strings() {
        assert_eq!(static_string(&expr_of("`Module`")).as_deref(), Some("Module"));
        assert_eq!(static_string(&expr_of("'Module'")).as_deref(), Some("Module"));
        assert_eq!(static_string(&expr_of("`M${x}`")), None);
    }

    #[test]
    fn member_and_ident_through_parens() {
        assert!(is_member(&expr_of("(Symbol.toStringTag)"), "Symbol", "toStringTag"));
        assert!(!is_member(&expr_of("Symbol['toStringTag']"), "Symbol", "toStringTag"));
        assert!(is_ident(&expr_of("((Error))"), "Error"));
    }
}
