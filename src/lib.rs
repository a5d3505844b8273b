//! Recover readable JSX from bundles compiled down to
//! `React.createElement(...)` call trees.
//!
//! The pipeline is two independent passes over an swc syntax tree:
//! [`shims`] gives bundler runtime helpers canonical names (`__require`,
//! `__exportAll`), then [`reconstruct`] turns every readable `createElement`
//! call into a JSX element. Both are pure functions of their input text.

pub mod batch;
pub mod config;
pub mod error;
pub mod format;
mod matching;
pub mod reconstruct;
pub mod shims;
pub mod syntax;

pub use batch::{transform_files, SourceInput, TransformedFile};
pub use config::{Config, Dialect, FormatOptions, ReceiverPolicy};
pub use error::{Error, FormatError, Result};
pub use format::{format_or_passthrough, Formatter, NoopFormatter, ReprintFormatter};
pub use reconstruct::{reconstruct_jsx, reconstruct_jsx_with, Reconstruction};
pub use shims::{normalize_shims, normalize_shims_with};

/// Normalize shims (unless disabled) and reconstruct JSX.
pub fn convert(source: &str, config: &Config) -> Result<String> {
    if !config.normalize_shims {
        return Ok(reconstruct_jsx_with(source, config)?.code);
    }
    let normalized = normalize_shims_with(source, config)?;
    Ok(reconstruct_jsx_with(&normalized, config)?.code)
}
