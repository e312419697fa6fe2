use super::clause::lbool;
use super::simp::SimpStats;

/// Basic callbacks to the solver
///
/// Typically intended for printing/statistics
pub trait Callbacks {
    /// Called before starting to solve
    fn on_start(&mut self) {}

    /// Called once the preprocessor is done with the clause set
    fn on_simplify(&mut self, _stats: &SimpStats) {}

    /// called regularly to indicate progress
    fn on_progress(&mut self, _f: &ProgressStatus) {}

    /// Called when a result is computed
    fn on_result(&mut self, _s: lbool) {}

    /// Should we stop? Called before each decision.
    fn stop(&self) -> bool {
        false
    }
}

/// Progress indicator from the SAT solver.
///
/// This is given to `Callbacks` every time activities decay, so it can log it somehow.
#[derive(Debug, Clone, Copy)]
pub struct ProgressStatus {
    pub conflicts: u64,
    pub decisions: u64,
    pub n_learnt: u64,
    pub n_clauses: u32,
    pub level: u32,
    pub unassigned: u32,
}

/// Basic set of callbacks
///
/// This doesn't do anything except storing a function to `stop`
pub struct Basic {
    stop: Option<Box<dyn Fn() -> bool>>, // to stop
}

impl std::fmt::Debug for Basic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Basic")
            .field("stop", &self.stop.is_some())
            .finish()
    }
}

impl Callbacks for Basic {
    fn stop(&self) -> bool {
        match self.stop {
            None => false,
            Some(ref f) => f(),
        }
    }
}

impl Basic {
    /// Allocate a new set of callbacks
    pub fn new() -> Self {
        Basic { stop: None }
    }

    /// Set the `stop` function
    pub fn set_stop<F>(&mut self, f: F)
    where
        F: 'static + Fn() -> bool,
    {
        self.stop = Some(Box::new(f));
    }
}

impl Default for Basic {
    fn default() -> Self {
        Basic::new()
    }
}
