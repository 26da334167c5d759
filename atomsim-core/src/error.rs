use crate::diagnostics::Diagnostics;
use crate::parser::ParseError;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by atom construction, world mutators and the scenario runtime.
///
/// Numerical degeneracies inside `World::update` never show up here; they are
/// handled where they occur.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid constructor or mutator argument.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Index past the end of the world's atom sequence.
    #[error("no atom at index {index} (world holds {len})")]
    NoSuchAtom { index: usize, len: usize },

    /// Scenario text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Scenario parsed but the analyzer reported errors.
    #[error("{0}")]
    Analysis(Diagnostics),

    /// A detector named an atom that does not exist.
    #[error("unknown atom '{0}'")]
    UnknownAtom(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;

    #[test]
    fn invalid_param_display_names_the_field() {
        let e = Error::InvalidParam("radius must be finite and > 0".to_string());
        let msg = e.to_string();
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("radius"));
    }

    #[test]
    fn analysis_display_lists_diagnostics() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::error("unknown type 'neon'", None));
        let msg = Error::Analysis(diagnostics).to_string();
        assert!(msg.contains("unknown type 'neon'"));
    }
}
