//! Error types for the conversion pipeline.

use thiserror::Error;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur while converting a motion capture to BVH.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A joint record references a parent that does not appear earlier in
    /// the joint list. This is a structural defect in the character file and
    /// aborts the whole run.
    #[error("malformed hierarchy: joint '{joint}' (record {index}) references unknown parent id {parent}")]
    MalformedHierarchy {
        /// Name of the offending joint.
        joint: String,
        /// Position of the record in the joint list.
        index: usize,
        /// The unresolved parent id.
        parent: i64,
    },

    /// A motion frame or side-file line has the wrong shape. Fatal for the
    /// input file it came from; there is no skip-and-continue.
    #[error("malformed motion record at {source_name} line {index}: {message}")]
    MalformedMotionRecord {
        /// What was being parsed ("frame", "velocity file", ...).
        source_name: String,
        /// Zero-based frame or line index.
        index: usize,
        /// What was wrong with it.
        message: String,
    },

    /// The character file contains no joint records at all.
    #[error("character file contains no joints")]
    EmptySkeleton,

    /// The motion file contains no frames, so there is nothing to emit and
    /// no frame time to derive.
    #[error("motion file contains no frames")]
    EmptyMotion,

    /// The hierarchy declares a different number of channels than the frame
    /// assembler produced. The channel layout is a cross-component contract;
    /// emitting anyway would yield a structurally valid but semantically
    /// corrupt document.
    #[error("hierarchy declares {declared} channels but assembled frames carry {assembled}")]
    ChannelMismatch {
        /// Channels declared by the hierarchy walk.
        declared: usize,
        /// Values per assembled frame.
        assembled: usize,
    },

    /// JSON parsing error from an input document.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ConvertError {
    /// Creates a malformed-hierarchy error.
    pub fn malformed_hierarchy(joint: impl Into<String>, index: usize, parent: i64) -> Self {
        Self::MalformedHierarchy {
            joint: joint.into(),
            index,
            parent,
        }
    }

    /// Creates a malformed-motion-record error.
    pub fn malformed_record(
        source_name: impl Into<String>,
        index: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedMotionRecord {
            source_name: source_name.into(),
            index,
            message: message.into(),
        }
    }
}
