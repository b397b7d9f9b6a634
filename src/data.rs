use std::fmt;
use std::io;

use thiserror::Error;

/// Kind of literal that was left open at end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    String,
    Regexp,
    /// A `[...]` character set inside a regexp literal.
    RegexpSet,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String => write!(f, "string literal"),
            Literal::Regexp => write!(f, "regexp literal"),
            Literal::RegexpSet => write!(f, "set in regexp literal"),
        }
    }
}

/// Place inside a macro comment where a comment boundary turned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanContext {
    String,
    Regexp,
    Condition,
    Stuff,
}

impl fmt::Display for ScanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanContext::String => write!(f, "string"),
            ScanContext::Regexp => write!(f, "regexp"),
            ScanContext::Condition => write!(f, "condition"),
            ScanContext::Stuff => write!(f, "stuff"),
        }
    }
}

#[derive(Debug, Error)]
pub enum JsDevError {
    /// `line` is where the literal began, not where input ran out.
    #[error("{line}. unterminated {literal}.")]
    UnterminatedLiteral { line: usize, literal: Literal },

    #[error("{line}. unterminated condition.")]
    UnterminatedCondition { line: usize },

    #[error("{line}. unterminated stuff.")]
    UnterminatedStuff { line: usize },

    #[error("{line}. unterminated comment.")]
    UnterminatedComment { line: usize },

    #[error("{line}. nested comment.")]
    NestedComment { line: usize },

    #[error("{line}. unexpected comment boundary in {context}.")]
    AmbiguousCommentBoundary { line: usize, context: ScanContext },

    #[error("bad command line {arg}")]
    Config { arg: String },

    /// `line` is `None` for writes made before any input is read.
    #[error("{}{source}", line_prefix(.line))]
    Io {
        line: Option<usize>,
        #[source]
        source: io::Error,
    },
}

impl JsDevError {
    /// Line the diagnostic points at, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            JsDevError::UnterminatedLiteral { line, .. }
            | JsDevError::UnterminatedCondition { line }
            | JsDevError::UnterminatedStuff { line }
            | JsDevError::UnterminatedComment { line }
            | JsDevError::NestedComment { line }
            | JsDevError::AmbiguousCommentBoundary { line, .. } => Some(*line),
            JsDevError::Io { line, .. } => *line,
            JsDevError::Config { .. } => None,
        }
    }
}

fn line_prefix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("{}. ", line),
        None => "bad command line ".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, JsDevError>;
