//! Display formatting. Always best effort: a formatter that fails leaves the
//! text as it was.

use crate::config::{Config, Dialect, FormatOptions};
use crate::error::FormatError;
use crate::syntax;

pub trait Formatter: Send + Sync {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

impl<F> Formatter for F
where
    F: Fn(&str) -> Result<String, FormatError> + Send + Sync,
{
    fn format(&self, source: &str) -> Result<String, FormatError> {
        self(source)
    }
}

/// Leaves text untouched.
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        Ok(source.to_string())
    }
}

/// Re-parses and re-prints through the swc code generator.
pub struct ReprintFormatter {
    dialect: Dialect,
    options: FormatOptions,
}

impl ReprintFormatter {
    pub fn new(config: &Config) -> Self {
        Self {
            dialect: config.dialect,
            options: config.format.clone(),
        }
    }
}

impl Formatter for ReprintFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let parsed = syntax::parse(source, self.dialect)?;
        Ok(syntax::print(&parsed, &self.options)?)
    }
}

pub fn format_or_passthrough(formatter: &dyn Formatter, source: &str) -> String {
    match formatter.format(source) {
        Ok(formatted) => formatted,
        Err(e) => {
            tracing::warn!(error = %e, "formatting failed, keeping unformatted text");
            source.to_string()
        }
    }
}
