use crate::clause::{lbool, Lit, Var};

/// Main interface for a solver: it makes it possible to add clauses,
/// allocate variables, solve, and read the model back.
pub trait SolverInterface {
    fn num_vars(&self) -> u32;
    /// Number of input clauses, after normalization.
    fn num_clauses(&self) -> u64;
    /// Number of clauses learnt over all `solve` calls.
    fn num_learnts(&self) -> u64;
    fn num_conflicts(&self) -> u64;
    fn num_propagations(&self) -> u64;
    /// Number of branching decisions.
    fn num_decisions(&self) -> u64;

    /// `false` if the clause set is known to be unsatisfiable.
    fn is_ok(&self) -> bool;

    /// Print some current statistics to standard output.
    fn print_stats(&self);

    /// Creates a new SAT variable in the solver.
    fn new_var_default(&mut self) -> Var;

    /// The variable of index `v_idx`, allocating it (and every variable
    /// below it) if needed.
    fn var_of_int(&mut self, v_idx: u32) -> Var;

    /// Add a clause to the solver. Returns `false` if the solver is in
    /// an `UNSAT` state.
    ///
    /// The clause is normalized in place (sorted, duplicates removed).
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool;

    /// Search for a model, until a result is found or the `stop`
    /// callback asks to give up.
    ///
    /// Returns `lbool::TRUE` (sat), `lbool::FALSE` (unsat) or
    /// `lbool::UNDEF` (stopped).
    fn solve_limited(&mut self) -> lbool;

    /// Query whole model
    ///
    /// Precondition: last result was `Sat` (ie `lbool::TRUE`)
    fn get_model(&self) -> &[lbool];

    /// Query model for var
    ///
    /// Precondition: last result was `Sat` (ie `lbool::TRUE`)
    fn value_var(&self, v: Var) -> lbool;

    /// Query model for lit
    fn value_lit(&self, lit: Lit) -> lbool;
}
