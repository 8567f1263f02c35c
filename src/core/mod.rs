//! 核心业务逻辑模块
//!
//! 三级挂起/恢复引擎：程序 → 进程 → 线程

mod handle;
pub mod pausable;
pub mod process;
pub mod program;
pub mod target;
pub mod thread;

pub use pausable::{resume_all, suspend_all, sweep, PauseOp, Pausable, SweepReport};
pub use process::ProcessNode;
pub use program::ProgramNode;
pub use target::{FreezeState, Target};
pub use thread::ThreadHandle;
