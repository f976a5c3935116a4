//! roundtrip core library
//!
//! Domain types for decompiler round-trip testing:
//! - Fixture discovery in deterministic order
//! - Stage results and the verdict classifier
//! - Aggregation of verdicts into a run summary
//! - Corpus provenance and tracing setup shared by the binaries

pub mod aggregate;
pub mod corpus;
pub mod error;
pub mod fixture;
pub mod outcome;
pub mod telemetry;
pub mod verdict;

pub use aggregate::{AggregateReport, FailureEntry};
pub use corpus::CorpusSpec;
pub use error::{HarnessError, Result};
pub use fixture::{discover_fixtures, Fixture};
pub use outcome::StageResult;
pub use verdict::{classify_compile, classify_decompile, Verdict};
