//! Parsing and printing through swc. Every call owns a fresh `SourceMap`, so
//! nothing here is shared between files.

use swc_core::{
    common::{comments::SingleThreadedComments, sync::Lrc, FileName, SourceMap, Span, Spanned},
    ecma::{
        ast::{EsVersion, Module},
        codegen::{text_writer::JsWriter, Config as CodegenConfig, Emitter},
        parser::{parse_file_as_module, error::Error as ParserError, EsSyntax, Syntax, TsSyntax},
    },
};

use crate::config::{Dialect, FormatOptions};
use crate::error::{Error, Result};

/// A parsed module together with the source map its spans point into and
/// the comments collected while parsing.
pub struct Parsed {
    pub cm: Lrc<SourceMap>,
    pub comments: SingleThreadedComments,
    pub module: Module,
}

fn syntax_for(dialect: Dialect) -> Syntax {
    match dialect {
        Dialect::Tsx => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        Dialect::Jsx => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
    }
}

/// Parse `source` as an ES module. Recovered parser errors are treated as
/// failures too: a file either parses cleanly or is rejected.
pub fn parse(source: &str, dialect: Dialect) -> Result<Parsed> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Anon.into(), source.to_string());

    let comments = SingleThreadedComments::default();
    let mut recovered = vec![];
    let module = parse_file_as_module(
        &fm,
        syntax_for(dialect),
        EsVersion::latest(),
        Some(&comments),
        &mut recovered,
    )
    .map_err(|e| parse_error(&cm, &e))?;

    if let Some(first) = recovered.first() {
        return Err(parse_error(&cm, first));
    }

    Ok(Parsed {
        cm,
        comments,
        module,
    })
}

fn parse_error(cm: &SourceMap, err: &ParserError) -> Error {
    let (line, column) = position(cm, err.span());
    let message = err.kind().msg().to_string();
    tracing::debug!(%message, line, column, "parse failed");
    Error::Parse {
        message,
        line,
        column,
    }
}

fn position(cm: &SourceMap, span: Span) -> (usize, usize) {
    if span.is_dummy() {
        return (0, 0);
    }
    let loc = cm.lookup_char_pos(span.lo());
    (loc.line, loc.col.0 + 1)
}

/// Serialize the (possibly rewritten) module back to source text, comments
/// included.
pub fn print(parsed: &Parsed, options: &FormatOptions) -> Result<String> {
    let mut buf = vec![];
    {
        let wr = JsWriter::new(parsed.cm.clone(), "\n", &mut buf, None);
        let mut emitter = Emitter {
            cfg: CodegenConfig::default()
                .with_target(EsVersion::latest())
                .with_minify(options.minify)
                .with_ascii_only(options.ascii_only)
                .with_omit_last_semi(!options.semi),
            cm: parsed.cm.clone(),
            comments: Some(&parsed.comments),
            wr,
        };
        emitter.emit_module(&parsed.module)?;
    }
    Ok(String::from_utf8(buf)?)
}
