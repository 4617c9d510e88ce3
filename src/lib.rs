//! Identifier benchmark harness
//!
//! Measures what it costs to use a 128-bit UUID versus its canonical string
//! as an application identifier.
//!
//! ## Architecture
//! - Fixture: per-thread corpus, lookup tables, probe and the eight measured operations
//! - Codec: self-describing generic codec vs registered-type compact codec
//! - Sink: guaranteed-not-elided consumption point for every result
//! - Bench: iteration scheduler, forking and the summary report

pub mod bench;
pub mod codec;
pub mod config;
pub mod error;
pub mod fixture;
pub mod sink;
pub mod types;

pub use bench::{BenchResult, Runner};
pub use codec::{Codec, CompactCodec, GenericCodec};
pub use config::Config;
pub use error::{BenchError, Result};
pub use fixture::{Fixture, Operation};
pub use sink::{Blackhole, ResultSink, Tally};
pub use types::{Corpus, LookupTables, Probe};
