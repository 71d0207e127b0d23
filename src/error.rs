use thiserror::Error;

use crate::parse::ParseError;
use crate::{EngineError, EvalError, MalformedRule};

/// Unified error type covering parsing, rule validation, evaluation, engine
/// mutators and I/O.
///
/// Returned by convenience methods like
/// [`RuleSet::from_dsl()`](crate::RuleSet::from_dsl) and
/// [`RuleSet::from_file()`](crate::RuleSet::from_file).
#[derive(Debug, Error)]
pub enum FormRulesError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Malformed(#[from] MalformedRule),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
