//! End-to-end behaviour of the public entry points.

use jsx_recover::{
    convert, normalize_shims, reconstruct_jsx, reconstruct_jsx_with, transform_files, Config, Error,
    NoopFormatter, ReceiverPolicy, ReprintFormatter, SourceInput,
};
use rstest::rstest;

const RUNTIME_CHUNK: &str = r#"var e = Object.defineProperty;
var t = (t, n) => {
  let r = {};
  for (var i in t) e(r, i, { get: t[i], enumerable: !0 });
  return n && e(r, Symbol.toStringTag, { value: `Module` }), r;
};
var n = ((e) => typeof require < `u` ? require : typeof Proxy < `u` ? new Proxy(e, { get: (e, t) => (typeof require < `u` ? require : e)[t] }) : e)(function (e) {
  if (typeof require < `u`) return require.apply(this, arguments);
  throw Error('Calling `require` for "' + e + "\" in an environment that doesn't expose the `require` function.");
});
export { t as n, n as t };
"#;

#[rstest]
#[case::unbalanced_braces("function f() { return React.createElement('a', null);")]
#[case::stray_paren("React.createElement('a', null));")]
#[case::bad_object("x = { a: };")]
fn invalid_input_is_a_parse_error(#[case] src: &str) {
    assert!(matches!(reconstruct_jsx(src), Err(Error::Parse { .. })));
    assert!(matches!(normalize_shims(src), Err(Error::Parse { .. })));
    assert!(matches!(convert(src, &Config::default()), Err(Error::Parse { .. })));
}

#[test]
fn shape_coverage() {
    let out = reconstruct_jsx(r#"export default () => React.createElement("div", {id: "x"}, "hello");"#).unwrap();
    assert!(out.contains(r#"<div id="x">hello</div>"#), "{out}");
}

#[test]
fn br_is_self_closing() {
    let out = reconstruct_jsx(r#"const br = React.createElement("br");"#).unwrap();
    assert!(out.contains("<br"), "{out}");
    assert!(out.contains("/>"), "{out}");
    assert!(!out.contains("</br>"), "{out}");
}

#[test]
fn computed_type_is_left_byte_identical() {
    let src = "const el = React.createElement(getType(), null);\n";
    assert_eq!(reconstruct_jsx(src).unwrap(), src);
}

#[test]
fn idempotent_on_own_output() {
    let src = r#"
        function App(props) {
            return React.createElement(Layout, {title: props.title},
                React.createElement("ul", null, ...props.items.map((i) => React.createElement(Item, {key: i.id, item: i}))),
                React.createElement("footer", null, "bye"));
        }
    "#;
    let once = reconstruct_jsx(src).unwrap();
    assert!(!once.contains("createElement"), "{once}");
    assert_eq!(reconstruct_jsx(&once).unwrap(), once);
}

#[test]
fn receiver_policy_is_configurable() {
    let src = r#"const a = e.createElement("span", null, "x");"#;
    assert_eq!(reconstruct_jsx(src).unwrap(), src);

    let any = Config {
        receiver: ReceiverPolicy::Any,
        ..Config::default()
    };
    let out = reconstruct_jsx_with(src, &any).unwrap();
    assert_eq!(out.converted, 1);
    assert!(out.code.contains("<span>x</span>"), "{}", out.code);

    let from_json = Config::from_json(r#"{"receiver": "e"}"#);
    assert_eq!(reconstruct_jsx_with(src, &from_json).unwrap().converted, 1);
}

#[test]
fn runtime_chunk_shims_get_canonical_names() {
    let out = normalize_shims(RUNTIME_CHUNK).unwrap();
    assert!(out.contains("var __exportAll ="), "{out}");
    assert!(out.contains("var __require ="), "{out}");
    assert!(out.contains("function __require(e)"), "{out}");
    assert!(out.contains("__exportAll as n"), "{out}");
    assert!(out.contains("__require as t"), "{out}");
    // the unrelated helper keeps its name
    assert!(out.contains("var e = Object.defineProperty"), "{out}");
}

#[test]
fn comments_survive_both_passes() {
    let src = "/*! license v1 */\n// keep me\nx = React.createElement(\"br\");\n";
    let out = reconstruct_jsx(src).unwrap();
    assert!(out.contains("<br"), "{out}");
    assert!(out.contains("/*! license v1 */"), "{out}");
    assert!(out.contains("// keep me"), "{out}");

    let src = format!("/*! license v1 */\n{RUNTIME_CHUNK}");
    let out = normalize_shims(&src).unwrap();
    assert!(out.contains("var __require ="), "{out}");
    assert!(out.contains("/*! license v1 */"), "{out}");

    let out = convert(&format!("{src}// tail\nx = React.createElement(\"br\");\n"), &Config::default()).unwrap();
    assert!(out.contains("/*! license v1 */"), "{out}");
    assert!(out.contains("// tail"), "{out}");
}

#[test]
fn plain_file_is_untouched_by_normalizer() {
    let src = "const   r = (x) => x;\nexport { r };\n";
    assert_eq!(normalize_shims(src).unwrap(), src);
}

#[test]
fn convert_runs_both_passes() {
    let src = format!("{RUNTIME_CHUNK}export const App = () => React.createElement(\"main\", null);\n");
    let out = convert(&src, &Config::default()).unwrap();
    assert!(out.contains("var __require ="), "{out}");
    assert!(out.contains("<main"), "{out}");

    let no_shims = Config::from_json(r#"{"normalize_shims": false}"#);
    let out = convert(&src, &no_shims).unwrap();
    assert!(!out.contains("__require"), "{out}");
    assert!(out.contains("<main"), "{out}");
}

#[test]
fn batch_marks_root_and_keeps_order() {
    let files = vec![
        SourceInput {
            id: "runtime".into(),
            name: "rolldown-runtime.js".into(),
            path: "assets/rolldown-runtime.js".into(),
            content: RUNTIME_CHUNK.into(),
        },
        SourceInput {
            id: "app".into(),
            name: "index.js".into(),
            path: "assets/index.js".into(),
            content: r#"export const App = () => React.createElement("h1", {className: "title"}, "Hi");"#.into(),
        },
        SourceInput {
            id: "broken".into(),
            name: "broken.js".into(),
            path: "assets/broken.js".into(),
            content: "export const = ;".into(),
        },
    ];
    let config = Config::default();
    let out = transform_files(files, &config, &ReprintFormatter::new(&config));

    let ids: Vec<_> = out.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, ["runtime", "app", "broken"]);
    assert_eq!(out.iter().filter(|f| f.is_root).count(), 1);
    assert!(out[1].is_root);
    assert!(out[0].converted.contains("__require"));
    assert!(out[1].converted.contains(r#"<h1 className="title">Hi</h1>"#), "{}", out[1].converted);
    assert!(out[2].error.is_some());
    assert!(out[2].converted.is_empty());
}

#[test]
fn batch_without_root() {
    let files = vec![SourceInput {
        id: "1".into(),
        name: "a.js".into(),
        path: "a.js".into(),
        content: "export const a = 1;".into(),
    }];
    let out = transform_files(files, &Config::default(), &NoopFormatter);
    assert!(!out[0].is_root);
    assert_eq!(out[0].converted, "export const a = 1;");
}
