//! scopeseq: Scope & Sequence Builder
//!
//! Groups curriculum standards into instructional units by sending one
//! request to a large language model. The request builder, the response
//! parser and the sample sequence mapper are pure; the remote call sits
//! behind the [`provider::ModelProviderClient`] trait.

pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod logging;
pub mod prompt;
pub mod provider;
pub mod sample;
pub mod sequencer;
pub mod standards;
pub mod table;
pub mod units;
