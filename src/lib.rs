//! GTAPPL Library
//!
//! Freezes every thread of every running instance of a named application,
//! then thaws them again. The engine is a three-level tree (program,
//! process, thread) sharing one `Pausable` contract.

pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod freeze;
pub mod platform;
pub mod settings;
pub mod signal;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::{
    resume_all, suspend_all, FreezeState, PauseOp, Pausable, ProcessNode, ProgramNode,
    SweepReport, Target, ThreadHandle,
};
pub use error::{FreezeError, FreezeResult};
pub use platform::{NativeThreads, RawHandle};
pub use settings::Settings;
