//! Canonical names for bundler runtime helpers.
//!
//! Two idioms are recognised: the "require" shim that throws
//! ``Calling `require` for "…"`` when no CommonJS `require` exists, and the
//! export-all helper that tags namespace objects with
//! `Symbol.toStringTag = "Module"`. Detection runs first and yields at most
//! one [`RenameTarget`] per kind; the rewrite is a separate pass keyed on it.

use swc_core::{
    common::{Span, SyntaxContext, DUMMY_SP},
    ecma::{
        ast::*,
        utils::collect_decls,
        visit::{Visit, VisitMut, VisitMutWith, VisitWith},
    },
};

use crate::config::Config;
use crate::error::Result;
use crate::matching::{is_ident, is_member, literal_fragments, prop_name_is, static_string, unparen};
use crate::syntax;

const REQUIRE_MESSAGE: &str = "Calling `require` for \"";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShimKind {
    Require,
    ExportAll,
}

impl ShimKind {
    pub fn canonical_name(self) -> &'static str {
        match self {
            ShimKind::Require => "__require",
            ShimKind::ExportAll => "__exportAll",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameTarget {
    pub kind: ShimKind,
    pub bound_name: String,
    pub canonical_name: &'static str,
    /// Span of the declared identifier; only that declarator is renamed.
    pub(crate) span: Span,
    /// Whether the binding lives in module scope, so `export { .. }` can name it.
    pub(crate) module_scope: bool,
}

impl RenameTarget {
    fn new(kind: ShimKind, binding: &BindingIdent, module_scope: bool) -> Self {
        Self {
            kind,
            bound_name: binding.id.sym.to_string(),
            canonical_name: kind.canonical_name(),
            span: binding.id.span,
            module_scope,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShimTargets {
    pub require: Option<RenameTarget>,
    pub export_all: Option<RenameTarget>,
}

impl ShimTargets {
    pub fn is_empty(&self) -> bool {
        self.require.is_none() && self.export_all.is_none()
    }

    fn is_complete(&self) -> bool {
        self.require.is_some() && self.export_all.is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenameTarget> {
        self.require.iter().chain(self.export_all.iter())
    }

    fn by_span(&self, span: Span) -> Option<&RenameTarget> {
        self.iter().find(|t| t.span == span)
    }

    fn exported_by_name(&self, name: &str) -> Option<&RenameTarget> {
        self.iter().find(|t| t.module_scope && t.bound_name == name)
    }

    fn retain(&mut self, mut keep: impl FnMut(&RenameTarget) -> bool) {
        if self.require.as_ref().is_some_and(|t| !keep(t)) {
            self.require = None;
        }
        if self.export_all.as_ref().is_some_and(|t| !keep(t)) {
            self.export_all = None;
        }
    }
}

// -----------------------------------------------------------------------------
// Detectors
// -----------------------------------------------------------------------------

/// `((x) => ...)(function (e) { ... throw Error('Calling `require` for "' + e ...) })`
fn is_require_shim_init(init: &Expr) -> bool {
    let Expr::Call(call) = unparen(init) else {
        return false;
    };
    match call.args.first() {
        Some(ExprOrSpread { spread: None, expr }) => match unparen(expr) {
            Expr::Fn(f) => throws_require_error(&f.function),
            _ => false,
        },
        _ => false,
    }
}

fn throws_require_error(function: &Function) -> bool {
    let mut finder = RequireThrowFinder { found: false };
    if let Some(body) = &function.body {
        body.visit_with(&mut finder);
    }
    finder.found
}

struct RequireThrowFinder {
    found: bool,
}

impl Visit for RequireThrowFinder {
    fn visit_throw_stmt(&mut self, n: &ThrowStmt) {
        if self.found {
            return;
        }
        if is_require_error(&n.arg) {
            self.found = true;
            return;
        }
        n.visit_children_with(self);
    }
}

/// `Error(msg)` or `new Error(msg)` where `msg` spells out the require message.
fn is_require_error(expr: &Expr) -> bool {
    let (callee, args) = match unparen(expr) {
        Expr::Call(CallExpr {
            callee: Callee::Expr(callee),
            args,
            ..
        }) => (&**callee, Some(args.as_slice())),
        Expr::New(n) => (&*n.callee, n.args.as_deref()),
        _ => return false,
    };
    if !is_error_ctor(callee) {
        return false;
    }
    let Some(message) = args.and_then(|a| a.first()) else {
        return false;
    };
    let mut fragments = vec![];
    literal_fragments(&message.expr, &mut fragments);
    fragments.iter().any(|f| f.contains(REQUIRE_MESSAGE))
}

fn is_error_ctor(expr: &Expr) -> bool {
    match unparen(expr) {
        Expr::Ident(_) => is_ident(expr, "Error"),
        // globalThis.Error, window.Error
        Expr::Member(m) => matches!(&m.prop, MemberProp::Ident(p) if p.sym.as_ref() == "Error"),
        _ => false,
    }
}

/// `(all, symbols) => { ...; defProp(target, Symbol.toStringTag, { value: "Module" }); ... }`
fn is_export_all_init(init: &Expr) -> bool {
    let Expr::Arrow(arrow) = unparen(init) else {
        return false;
    };
    let mut finder = ModuleTagFinder { found: false };
    (*arrow.body).visit_with(&mut finder);
    finder.found
}

struct ModuleTagFinder {
    found: bool,
}

impl Visit for ModuleTagFinder {
    fn visit_call_expr(&mut self, n: &CallExpr) {
        if self.found {
            return;
        }
        if is_module_tag_call(n) {
            self.found = true;
            return;
        }
        n.visit_children_with(self);
    }
}

fn is_module_tag_call(call: &CallExpr) -> bool {
    let [_, tag, descriptor, ..] = call.args.as_slice() else {
        return false;
    };
    if tag.spread.is_some() || descriptor.spread.is_some() {
        return false;
    }
    if !is_member(&tag.expr, "Symbol", "toStringTag") {
        return false;
    }
    let Expr::Object(obj) = unparen(&descriptor.expr) else {
        return false;
    };
    obj.props.iter().any(|p| match p {
        PropOrSpread::Prop(p) => match &**p {
            Prop::KeyValue(kv) => {
                prop_name_is(&kv.key, "value") && static_string(&kv.value).as_deref() == Some("Module")
            }
            _ => false,
        },
        PropOrSpread::Spread(_) => false,
    })
}

#[derive(Default)]
struct ShimFinder {
    targets: ShimTargets,
    // function-like bodies entered
    fn_depth: usize,
    // blocks and loop heads entered, for `let`/`const`
    block_depth: usize,
    decl_kind: Option<VarDeclKind>,
}

impl ShimFinder {
    fn in_module_scope(&self) -> bool {
        self.fn_depth == 0 && (self.decl_kind == Some(VarDeclKind::Var) || self.block_depth == 0)
    }

    fn in_function<N: VisitWith<Self>>(&mut self, n: &N) {
        self.fn_depth += 1;
        n.visit_children_with(self);
        self.fn_depth -= 1;
    }

    fn in_block<N: VisitWith<Self>>(&mut self, n: &N) {
        self.block_depth += 1;
        n.visit_children_with(self);
        self.block_depth -= 1;
    }
}

impl Visit for ShimFinder {
    fn visit_stmt(&mut self, n: &Stmt) {
        if self.targets.is_complete() {
            return;
        }
        n.visit_children_with(self);
    }

    fn visit_function(&mut self, n: &Function) {
        self.in_function(n);
    }

    fn visit_arrow_expr(&mut self, n: &ArrowExpr) {
        self.in_function(n);
    }

    fn visit_getter_prop(&mut self, n: &GetterProp) {
        self.in_function(n);
    }

    fn visit_setter_prop(&mut self, n: &SetterProp) {
        self.in_function(n);
    }

    fn visit_constructor(&mut self, n: &Constructor) {
        self.in_function(n);
    }

    fn visit_static_block(&mut self, n: &StaticBlock) {
        self.in_function(n);
    }

    fn visit_block_stmt(&mut self, n: &BlockStmt) {
        self.in_block(n);
    }

    fn visit_for_stmt(&mut self, n: &ForStmt) {
        self.in_block(n);
    }

    fn visit_for_in_stmt(&mut self, n: &ForInStmt) {
        self.in_block(n);
    }

    fn visit_for_of_stmt(&mut self, n: &ForOfStmt) {
        self.in_block(n);
    }

    fn visit_var_decl(&mut self, n: &VarDecl) {
        let outer = self.decl_kind.replace(n.kind);
        n.visit_children_with(self);
        self.decl_kind = outer;
    }

    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        if let (Some(binding), Some(init)) = (d.name.as_ident(), d.init.as_deref()) {
            let module_scope = self.in_module_scope();
            if self.targets.require.is_none() && is_require_shim_init(init) {
                self.targets.require = Some(RenameTarget::new(ShimKind::Require, binding, module_scope));
            } else if self.targets.export_all.is_none() && is_export_all_init(init) {
                self.targets.export_all =
                    Some(RenameTarget::new(ShimKind::ExportAll, binding, module_scope));
            }
        }
        d.visit_children_with(self);
    }
}

/// First matching declarator of each kind, anywhere in the module.
pub fn detect(module: &Module) -> ShimTargets {
    let mut finder = ShimFinder::default();
    module.visit_with(&mut finder);
    finder.targets
}

// -----------------------------------------------------------------------------
// Rewrite
// -----------------------------------------------------------------------------

struct ShimRenamer<'a> {
    targets: &'a ShimTargets,
    in_require_init: bool,
    renamed: usize,
}

impl VisitMut for ShimRenamer<'_> {
    fn visit_mut_var_declarator(&mut self, d: &mut VarDeclarator) {
        let target = match &d.name {
            Pat::Ident(b) => self
                .targets
                .by_span(b.id.span)
                .map(|t| (t.kind, t.canonical_name)),
            _ => None,
        };
        let Some((kind, canonical)) = target else {
            d.visit_mut_children_with(self);
            return;
        };

        if let Pat::Ident(binding) = &mut d.name {
            binding.id.sym = canonical.into();
            self.renamed += 1;
        }
        let outer = self.in_require_init;
        self.in_require_init = kind == ShimKind::Require;
        d.init.visit_mut_with(self);
        self.in_require_init = outer;
    }

    fn visit_mut_fn_expr(&mut self, n: &mut FnExpr) {
        n.visit_mut_children_with(self);
        if !self.in_require_init || !throws_require_error(&n.function) {
            return;
        }
        let canonical = ShimKind::Require.canonical_name();
        match &mut n.ident {
            Some(ident) => ident.sym = canonical.into(),
            None => n.ident = Some(Ident::new(canonical.into(), DUMMY_SP, SyntaxContext::empty())),
        }
        self.renamed += 1;
    }

    fn visit_mut_named_export(&mut self, n: &mut NamedExport) {
        // `export { r } from "./x"` names another module's binding
        if n.src.is_some() {
            return;
        }
        for spec in &mut n.specifiers {
            let ExportSpecifier::Named(named) = spec else {
                continue;
            };
            if let ModuleExportName::Ident(orig) = &mut named.orig {
                let canonical = self
                    .targets
                    .exported_by_name(orig.sym.as_ref())
                    .map(|t| t.canonical_name);
                if let Some(canonical) = canonical {
                    orig.sym = canonical.into();
                    self.renamed += 1;
                }
            }
        }
    }
}

/// Drop targets that are already canonical or whose canonical name is taken.
fn usable_targets(mut targets: ShimTargets, module: &Module) -> ShimTargets {
    if targets.is_empty() {
        return targets;
    }
    let declared = collect_decls::<Id, _>(module);
    targets.retain(|t| {
        if t.bound_name == t.canonical_name {
            return false;
        }
        let taken = declared.iter().any(|(sym, _)| sym.as_ref() == t.canonical_name);
        if taken {
            tracing::warn!(
                bound = %t.bound_name,
                canonical = t.canonical_name,
                "canonical name already declared, leaving shim as is"
            );
        }
        !taken
    });
    targets
}

/// Apply `targets` to `module`; returns how many identifiers were renamed.
pub fn rewrite(module: &mut Module, targets: &ShimTargets) -> usize {
    let mut renamer = ShimRenamer {
        targets,
        in_require_init: false,
        renamed: 0,
    };
    module.visit_mut_with(&mut renamer);
    renamer.renamed
}

/// Unchanged input comes back byte-for-byte.
pub fn normalize_shims_with(source: &str, config: &Config) -> Result<String> {
    let mut parsed = syntax::parse(source, config.dialect)?;
    let targets = usable_targets(detect(&parsed.module), &parsed.module);
    if targets.is_empty() {
        return Ok(source.to_string());
    }

    let renamed = rewrite(&mut parsed.module, &targets);
    if renamed == 0 {
        return Ok(source.to_string());
    }
    for t in targets.iter() {
        tracing::debug!(bound = %t.bound_name, canonical = t.canonical_name, "renamed runtime shim");
    }
    syntax::print(&parsed, &config.format)
}

pub fn normalize_shims(source: &str) -> Result<String> {
    normalize_shims_with(source, &Config::default())
}
