//! Error type shared by every engine stage.
//!
//! `NumericDegeneracy` is produced by the numeric helpers in [`crate::stats`]
//! and is always matched and skipped by the calling stage; it never leaves
//! the pipeline. The other kinds are returned to the caller.

use std::fmt;

/// Unified error for draw validation, configuration and engine stages.
#[derive(Debug, Clone, PartialEq)]
pub enum RootShiftError {
    /// A stage received fewer items than it needs.
    InsufficientData {
        stage: &'static str,
        needed: usize,
        got: usize,
    },

    /// A draw has the wrong cardinality, an out-of-range value or duplicates.
    InvalidDraw { index: Option<usize>, reason: String },

    /// A configuration value is outside its admissible range.
    Configuration(String),

    /// A series or window has zero variance for a specific calculation.
    NumericDegeneracy { context: String },

    /// Reading an input file failed.
    Io(String),

    /// An input file could not be parsed into draws.
    Parse(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RootShiftError>;

impl RootShiftError {
    pub fn insufficient(stage: &'static str, needed: usize, got: usize) -> Self {
        Self::InsufficientData { stage, needed, got }
    }

    pub fn invalid_draw(reason: impl Into<String>) -> Self {
        Self::InvalidDraw {
            index: None,
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn degenerate(context: impl Into<String>) -> Self {
        Self::NumericDegeneracy {
            context: context.into(),
        }
    }

    /// Attaches the position of the offending draw within its sequence.
    pub fn at_draw(self, position: usize) -> Self {
        match self {
            Self::InvalidDraw { reason, .. } => Self::InvalidDraw {
                index: Some(position),
                reason,
            },
            other => other,
        }
    }

    /// Short machine-friendly tag for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "insufficient_data",
            Self::InvalidDraw { .. } => "invalid_draw",
            Self::Configuration(_) => "configuration",
            Self::NumericDegeneracy { .. } => "numeric_degeneracy",
            Self::Io(_) => "io",
            Self::Parse(_) => "parse",
        }
    }
}

impl fmt::Display for RootShiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData { stage, needed, got } => write!(
                f,
                "insufficient data for {stage}: need {needed}, got {got}"
            ),
            Self::InvalidDraw {
                index: Some(index),
                reason,
            } => write!(f, "invalid draw at position {index}: {reason}"),
            Self::InvalidDraw { index: None, reason } => write!(f, "invalid draw: {reason}"),
            Self::Configuration(message) => write!(f, "configuration error: {message}"),
            Self::NumericDegeneracy { context } => {
                write!(f, "numeric degeneracy: zero variance in {context}")
            }
            Self::Io(message) => write!(f, "i/o error: {message}"),
            Self::Parse(message) => write!(f, "parse error: {message}"),
        }
    }
}

impl std::error::Error for RootShiftError {}

impl From<std::io::Error> for RootShiftError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RootShiftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
