//! Pretty-printing of extracted module bodies.

use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::{ParseOptions, Parser};
use oxc_span::SourceType;

/// Formatting failed; the caller falls back to the unformatted text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FormatError {
    pub message: String,
}

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Pretty-printer collaborator used by the emitter.
pub trait CodeFormatter: Send + Sync {
    fn format(&self, code: &str) -> Result<String, FormatError>;
}

/// Reprints code through `oxc_parser` and `oxc_codegen`.
///
/// Module bodies are the inside of a CommonJS factory, so top-level `return`
/// is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcFormatter;

impl CodeFormatter for OxcFormatter {
    fn format(&self, code: &str) -> Result<String, FormatError> {
        let allocator = Allocator::default();
        let options = ParseOptions {
            allow_return_outside_function: true,
            ..ParseOptions::default()
        };
        let ret = Parser::new(&allocator, code, SourceType::cjs())
            .with_options(options)
            .parse();

        if ret.panicked || !ret.errors.is_empty() {
            let message = ret
                .errors
                .iter()
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FormatError::new(if message.is_empty() {
                "parser aborted".to_string()
            } else {
                message
            }));
        }

        Ok(Codegen::new().build(&ret.program).code)
    }
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl CodeFormatter for NoopFormatter {
    fn format(&self, code: &str) -> Result<String, FormatError> {
        Ok(code.to_string())
    }
}
