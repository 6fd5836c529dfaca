// src/error.rs
//! Unified error handling for feature extraction
//!
//! Every failure inside the extraction core is reported as a [`FeatureError`].
//! Nothing is converted into a NaN or a sentinel value: the batch processor
//! decides, per configured policy, whether a failing segment aborts the run or
//! is skipped and reported.
//!
//! Errors raised by a calculator carry an [`ErrorContext`] that is filled in as
//! the error travels up the call stack (channel index by the aggregator,
//! segment index by the batch processor). The error kind never changes on the
//! way up.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Location of a failure inside a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Zero-based row of the input table
    pub segment: Option<usize>,
    /// Zero-based channel within the segment
    pub channel: Option<usize>,
}

impl ErrorContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context pointing at a single channel
    pub fn for_channel(channel: usize) -> Self {
        Self { segment: None, channel: Some(channel) }
    }

    /// Context pointing at a segment
    pub fn for_segment(segment: usize) -> Self {
        Self { segment: Some(segment), channel: None }
    }

    pub fn is_empty(&self) -> bool {
        self.segment.is_none() && self.channel.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.segment, self.channel) {
            (Some(seg), Some(ch)) => write!(f, " (segment {}, channel {})", seg, ch),
            (Some(seg), None) => write!(f, " (segment {})", seg),
            (None, Some(ch)) => write!(f, " (channel {})", ch),
            (None, None) => Ok(()),
        }
    }
}

/// Unified error type for the extraction pipeline
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Segment length does not fit the configured channel geometry
    #[error("[SHAPE] Segment of {actual_len} values cannot be reshaped into {num_channels} channels: {reason}{context}")]
    ShapeMismatch {
        num_channels: usize,
        actual_len: usize,
        reason: String,
        context: ErrorContext,
    },

    /// Signal too short for a requested algorithm parameter
    #[error("[LENGTH] {metric} needs at least {required} samples, got {actual}{context}")]
    InsufficientLength {
        metric: &'static str,
        required: usize,
        actual: usize,
        context: ErrorContext,
    },

    /// Computation is mathematically undefined for this input
    #[error("[DEGENERATE] {metric} is undefined: {reason}{context}")]
    DegenerateSignal {
        metric: &'static str,
        reason: String,
        context: ErrorContext,
    },

    /// A record's key set diverges from the schema established by the batch
    #[error("[SCHEMA] Record has {actual_columns} columns, schema has {expected_columns}: {detail}{context}")]
    SchemaMismatch {
        expected_columns: usize,
        actual_columns: usize,
        detail: String,
        context: ErrorContext,
    },

    /// Invalid analysis configuration
    #[error("[CONFIG] Invalid value for '{field}': {reason}")]
    Configuration { field: String, reason: String },

    /// Reading or writing a file failed
    #[error("[IO] {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed input table or failed table serialization
    #[error("[TABLE] {reason}")]
    Table { reason: String },
}

/// Result type alias for extraction operations
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Coarse error classification, used for reports and policy decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ShapeMismatch,
    InsufficientLength,
    DegenerateSignal,
    SchemaMismatch,
    Configuration,
    Io,
    Table,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ShapeMismatch => "ShapeMismatchError",
            ErrorKind::InsufficientLength => "InsufficientLengthError",
            ErrorKind::DegenerateSignal => "DegenerateSignalError",
            ErrorKind::SchemaMismatch => "SchemaMismatchError",
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Io => "IoError",
            ErrorKind::Table => "TableError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FeatureError {
    /// Shorthand for an [`FeatureError::InsufficientLength`] without context
    pub fn insufficient_length(metric: &'static str, required: usize, actual: usize) -> Self {
        FeatureError::InsufficientLength {
            metric,
            required,
            actual,
            context: ErrorContext::new(),
        }
    }

    /// Shorthand for a [`FeatureError::DegenerateSignal`] without context
    pub fn degenerate(metric: &'static str, reason: impl Into<String>) -> Self {
        FeatureError::DegenerateSignal {
            metric,
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Shorthand for a [`FeatureError::Configuration`]
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FeatureError::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`FeatureError::Table`]
    pub fn table(reason: impl Into<String>) -> Self {
        FeatureError::Table { reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FeatureError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            FeatureError::InsufficientLength { .. } => ErrorKind::InsufficientLength,
            FeatureError::DegenerateSignal { .. } => ErrorKind::DegenerateSignal,
            FeatureError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            FeatureError::Configuration { .. } => ErrorKind::Configuration,
            FeatureError::Io { .. } => ErrorKind::Io,
            FeatureError::Table { .. } => ErrorKind::Table,
        }
    }

    /// Metric that failed, when the error comes from a calculator
    pub fn metric(&self) -> Option<&'static str> {
        match self {
            FeatureError::InsufficientLength { metric, .. }
            | FeatureError::DegenerateSignal { metric, .. } => Some(metric),
            _ => None,
        }
    }

    /// Location of the failure, for the variants that carry one
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            FeatureError::ShapeMismatch { context, .. }
            | FeatureError::InsufficientLength { context, .. }
            | FeatureError::DegenerateSignal { context, .. }
            | FeatureError::SchemaMismatch { context, .. } => Some(context),
            _ => None,
        }
    }

    fn context_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            FeatureError::ShapeMismatch { context, .. }
            | FeatureError::InsufficientLength { context, .. }
            | FeatureError::DegenerateSignal { context, .. }
            | FeatureError::SchemaMismatch { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Attach the channel index, keeping the error kind
    pub fn at_channel(mut self, channel: usize) -> Self {
        if let Some(context) = self.context_mut() {
            context.channel = Some(channel);
        }
        self
    }

    /// Attach the segment index, keeping the error kind
    pub fn at_segment(mut self, segment: usize) -> Self {
        if let Some(context) = self.context_mut() {
            context.segment = Some(segment);
        }
        self
    }
}
