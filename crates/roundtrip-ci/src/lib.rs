//! roundtrip CI - compile/decompile round-trip pipeline
//!
//! Provides the pipeline that:
//! - Compiles each fixture with the reference compiler
//! - Decompiles the artifact with the decompiler under test
//! - Classifies, reports, and gates on the outcomes

pub mod gate;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod stage;
pub mod version;

// Re-export key types
pub use gate::{Gate, GateVerdict};
pub use pipeline::{FixtureRecord, Pipeline, PipelineSettings, RunOutcome};
pub use report::{Reporter, RunReport};
pub use runner::{CommandRunner, ProcessRunner, RunnerError};
pub use stage::{StageConfig, StageKind};
pub use version::detect_compiler_version;
