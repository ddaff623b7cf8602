#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod completion;
mod service;
mod tokenizer;
pub mod types;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod engine;

pub use converse_core::{Error, ErrorKind, Result, ServiceHealth, ServiceStatus};

pub use crate::completion::{
    CompletionAdapter, CompletionAnswer, CompletionContext, CompletionOutcome, CompletionStream,
    DEFAULT_CHANNEL_CAPACITY, NO_VALID_MESSAGES,
};
pub use crate::service::{DeltaStream, GenerationRequest, InferenceProvider, InferenceService};
pub use crate::tokenizer::{Cl100kTokenizer, Tokenizer, WhitespaceTokenizer};

/// Tracing target for inference operations.
pub const TRACING_TARGET: &str = "converse_inference";
