//! Error types for the tapline audio pipeline.

use std::fmt;

/// Errors that can occur while configuring or constructing the pipeline.
#[derive(Debug)]
pub enum PipelineError {
    /// A DSP parameter was malformed: even tap count, zero `fs`, zero `N`,
    /// or a missing output buffer were passed to the coefficient designer.
    InvalidArgument(String),
    /// A DSP object (delay line, comb filter, block pool) could not be
    /// constructed. Fatal at init; any partially constructed siblings are
    /// dropped by the caller.
    AllocationFailure(String),
    /// A delay-line cursor fell outside `[0, M)`. This is a programming
    /// error that must not occur under correct construction; callers should
    /// treat it as a fatal assertion rather than attempt recovery.
    InvalidState(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidArgument(msg) => {
                write!(f, "invalid argument: {msg}")
            }
            PipelineError::AllocationFailure(msg) => {
                write!(f, "allocation failure: {msg}")
            }
            PipelineError::InvalidState(msg) => {
                write!(f, "invalid state: {msg}")
            }
        }
    }
}

impl std::error::Error for PipelineError {}
