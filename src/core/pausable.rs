//! The suspend/resume contract shared by threads, processes and programs,
//! and the fail-fast helpers that fan it out over a collection.

/// Something that can be frozen and thawed.
///
/// Both operations report success as a flag; being unable to pause a
/// target is never an error.
pub trait Pausable {
    fn suspend(&self) -> bool;
    fn resume(&self) -> bool;
}

impl<T: Pausable + ?Sized> Pausable for &T {
    fn suspend(&self) -> bool {
        (**self).suspend()
    }

    fn resume(&self) -> bool {
        (**self).resume()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOp {
    Suspend,
    Resume,
}

impl PauseOp {
    pub fn apply<P: Pausable + ?Sized>(self, target: &P) -> bool {
        match self {
            PauseOp::Suspend => target.suspend(),
            PauseOp::Resume => target.resume(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PauseOp::Suspend => "suspend",
            PauseOp::Resume => "resume",
        }
    }
}

/// How far a fail-fast walk got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Elements in the collection
    pub total: usize,
    /// Elements the operation was invoked on
    pub attempted: usize,
    /// Index of the element that reported failure; elements after it were not touched
    pub failed_at: Option<usize>,
}

impl SweepReport {
    pub fn succeeded(&self) -> bool {
        self.failed_at.is_none()
    }

    /// Elements left in their previous state
    pub fn untouched(&self) -> usize {
        self.total - self.attempted
    }
}

/// Apply `op` to each element in order, stopping at the first failure.
pub fn sweep<P: Pausable>(items: &[P], op: PauseOp) -> SweepReport {
    let mut report = SweepReport {
        total: items.len(),
        attempted: 0,
        failed_at: None,
    };

    for (index, item) in items.iter().enumerate() {
        report.attempted += 1;
        if !op.apply(item) {
            report.failed_at = Some(index);
            break;
        }
    }

    report
}

pub fn suspend_all<P: Pausable>(items: &[P]) -> bool {
    sweep(items, PauseOp::Suspend).succeeded()
}

pub fn resume_all<P: Pausable>(items: &[P]) -> bool {
    sweep(items, PauseOp::Resume).succeeded()
}
