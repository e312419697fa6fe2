/*****************************************************************************************[core.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use {
    crate::callbacks::{Callbacks, ProgressStatus},
    crate::clause::{self, lbool, CRef, ClauseDb, LMap, Lit, VMap, Var},
    crate::interface::SolverInterface,
    crate::intmap::{Comparator, HeapData},
    crate::simp::{SimpStats, Simplifier},
    std::{cmp, fmt, mem},
};

#[cfg(feature = "logging")]
use crate::clause::display::Print;

/// The main solver structure
///
/// A `Solver` owns the input clauses, the options and the statistics.
/// Each call to `solve_limited` preprocesses a copy of the clauses and
/// builds a fresh search state for it; the input clauses are never
/// modified by search.
///
/// It is parametrized by `Callbacks`
#[derive(Debug)]
pub struct Solver<Cb: Callbacks> {
    /// If problem is satisfiable, this vector contains the model (if any).
    model: Vec<lbool>,
    cb: Cb, // the callbacks

    /// Normalized input clauses, none of them empty.
    clauses: Vec<Vec<Lit>>,
    num_vars: u32,
    /// `false` once the clause set is known to be unsatisfiable.
    ok: bool,

    opts: SolverOpts,
    stats: Stats,
    simp_stats: SimpStats,
}

#[derive(Debug, Default, Clone, Copy)]
struct Stats {
    solves: u64,
    decisions: u64,
    propagations: u64,
    conflicts: u64,
    learnts: u64,
    /// learnt clauses dropped for being too long
    discarded: u64,
    /// searches restarted on the input clauses after a bad model
    reruns: u64,
}

/// Outcome of propagating an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// All consequences are propagated.
    Continue,
    /// This branch fails.
    Conflict,
    /// Undo this many levels above the current one, then retry the level
    /// below them.
    BacktrackBy(u32),
}

/// State of the search driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Level0Propagation,
    Branching(u32),
    Backtracking(u32, Status),
    Sat,
    Unsat,
    Stopped,
}

/// A decision level that is on the stack: its variable, and the value
/// currently being tried (false first, then true).
#[derive(Debug, Clone, Copy)]
struct Frame {
    var: Var,
    value: bool,
}

/// What happened to a clause watching a literal that became false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// The watch moved to another literal.
    Moved,
    /// The other watch is true.
    Resolved,
    /// The other watch was unassigned and is now implied.
    Implied,
    /// Every literal is false.
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VarData {
    /// `CRef::UNDEF` for decisions, level 0 units, and unassigned variables.
    reason: CRef,
    /// `-1` when unassigned.
    level: i32,
    /// Position in the trail of `level`.
    pos: u32,
}

impl Default for VarData {
    fn default() -> Self {
        VarData {
            reason: CRef::UNDEF,
            level: -1,
            pos: 0,
        }
    }
}

/// The current assignments.
#[derive(Debug, Clone)]
struct VarState {
    /// Current assignment for each variable.
    ass: VMap<lbool>,
    /// Stores reason, level, and position for each variable.
    vardata: VMap<VarData>,
    /// VSIDS score.
    activity: VMap<u32>,
    /// Variables assigned at each level, in assignment order. The first
    /// variable of a level `> 0` is its decision.
    trail: Vec<Vec<Var>>,
    unassigned: u32,
}

impl VarState {
    fn new(num_vars: u32) -> Self {
        let mut vars = VarState {
            ass: VMap::new(),
            vardata: VMap::new(),
            activity: VMap::new(),
            trail: vec![vec![]],
            unassigned: num_vars,
        };
        if num_vars > 0 {
            let last = Var::from_idx(num_vars - 1);
            vars.ass.reserve(last, lbool::UNDEF);
            vars.vardata.reserve(last, VarData::default());
            vars.activity.reserve(last, 0);
        }
        vars
    }

    #[inline(always)]
    fn num_vars(&self) -> u32 {
        self.ass.len() as u32
    }

    #[inline(always)]
    fn value_lit(&self, lit: Lit) -> lbool {
        self.ass[lit.var()] ^ !lit.sign()
    }

    /// Make `lit` true at `level`.
    fn assign_lit(&mut self, lit: Lit, level: u32, reason: CRef) {
        let v = lit.var();
        assert!(
            self.ass[v] == lbool::UNDEF,
            "cannot assign {:?}, it already has a value",
            lit
        );
        let trail = &mut self.trail[level as usize];
        self.ass[v] = lbool::new(lit.sign());
        self.vardata[v] = VarData {
            reason,
            level: level as i32,
            pos: trail.len() as u32,
        };
        trail.push(v);
        self.unassigned -= 1;
    }
}

/// Order for the decision heap: higher activity first, then lower index.
struct VarOrder<'a> {
    activity: &'a VMap<u32>,
}

impl<'a> Comparator<Var> for VarOrder<'a> {
    fn cmp(&self, lhs: &Var, rhs: &Var) -> cmp::Ordering {
        self.activity[*rhs]
            .cmp(&self.activity[*lhs])
            .then(lhs.cmp(rhs))
    }
}

/// State of one search run over a fixed clause set.
struct Search<'a> {
    vars: VarState,
    db: ClauseDb,
    /// `watches[lit]`: clauses watching `lit`, visited when it becomes false.
    watches: LMap<Vec<CRef>>,
    /// Every unassigned variable is in the heap.
    order_heap_data: HeapData<Var>,
    /// Unit clauses, to be assigned at level 0.
    units: Vec<Lit>,

    max_learnt_len: usize,
    decay_interval: u64,
    conflicts_since_decay: u64,
    /// Activities were halved since the last progress report.
    decayed: bool,
    stats: &'a mut Stats,
}

impl<'a> Search<'a> {
    fn new(
        num_vars: u32,
        clauses: &[Vec<Lit>],
        opts: &SolverOpts,
        stats: &'a mut Stats,
    ) -> Self {
        let mut s = Search {
            vars: VarState::new(num_vars),
            db: ClauseDb::new(),
            watches: LMap::new(),
            order_heap_data: HeapData::new(),
            units: vec![],
            max_learnt_len: opts.max_learnt_len as usize,
            decay_interval: opts.decay_interval as u64,
            conflicts_since_decay: 0,
            decayed: false,
            stats,
        };
        if num_vars > 0 {
            let last = Lit::new(Var::from_idx(num_vars - 1), false);
            s.watches.reserve_default(last);
        }
        for c in clauses {
            debug_assert!(!c.is_empty(), "empty clauses never reach search");
            let cr = s.db.alloc(c, false);
            if c.len() == 1 {
                s.units.push(c[0]);
            } else {
                s.attach(cr, c[0], c[1]);
            }
        }
        let all_vars: Vec<Var> = (0..num_vars).map(Var::from_idx).collect();
        s.order_heap_data
            .promote(VarOrder {
                activity: &s.vars.activity,
            })
            .build(&all_vars);
        s
    }

    fn attach(&mut self, cr: CRef, w0: Lit, w1: Lit) {
        debug_assert_ne!(w0, w1);
        self.db.set_watched(cr, 0, w0);
        self.db.set_watched(cr, 1, w1);
        self.watches[w0].push(cr);
        self.watches[w1].push(cr);
    }

    /// Main loop. Returns `TRUE` with a full assignment, `FALSE`, or
    /// `UNDEF` if `cb` asked to stop.
    fn run<Cb: Callbacks>(&mut self, cb: &mut Cb) -> lbool {
        debug!(
            "search: {} vars, {} clauses, {} units",
            self.vars.num_vars(),
            self.db.len(),
            self.units.len()
        );
        let mut frames: Vec<Frame> = vec![];
        let mut state = State::Level0Propagation;
        loop {
            trace!("search state {:?}", state);
            state = match state {
                State::Level0Propagation => {
                    debug_assert!(frames.is_empty());
                    if self.propagate_units() {
                        State::Branching(1)
                    } else {
                        State::Unsat
                    }
                }
                State::Branching(level) => {
                    if self.vars.unassigned == 0 {
                        State::Sat
                    } else if cb.stop() {
                        State::Stopped
                    } else {
                        let var = self
                            .pick_branch_var()
                            .expect("unassigned variables are in the heap");
                        frames.push(Frame { var, value: false });
                        self.decide(level, var, false)
                    }
                }
                State::Backtracking(level, status) => {
                    self.unassign(level);
                    if self.decayed {
                        self.decayed = false;
                        cb.on_progress(&self.progress(level));
                    }
                    match status {
                        Status::BacktrackBy(0) => {
                            let f = *frames.last().expect("a frame per level");
                            self.decide(level, f.var, f.value)
                        }
                        Status::BacktrackBy(n) => {
                            frames.pop();
                            unwind(level, Status::BacktrackBy(n - 1))
                        }
                        Status::Conflict => {
                            let f = frames.last_mut().expect("a frame per level");
                            if f.value {
                                frames.pop();
                                unwind(level, Status::Conflict)
                            } else {
                                f.value = true;
                                let var = f.var;
                                self.decide(level, var, true)
                            }
                        }
                        Status::Continue => {
                            panic!("backtracking at level {} without a failure", level)
                        }
                    }
                }
                State::Sat => {
                    debug_assert!(self.is_model());
                    return lbool::TRUE;
                }
                State::Unsat => return lbool::FALSE,
                State::Stopped => {
                    debug!("search stopped at level {}", frames.len());
                    for level in (1..self.vars.trail.len() as u32).rev() {
                        self.unassign(level);
                    }
                    return lbool::UNDEF;
                }
            }
        }
    }

    /// Open `level` with the decision `var := value`, and propagate it.
    fn decide(&mut self, level: u32, var: Var, value: bool) -> State {
        debug_assert_eq!(self.vars.trail.len(), level as usize);
        trace!("decide {:?} := {} at level {}", var, value, level);
        self.stats.decisions += 1;
        self.vars.trail.push(vec![]);
        match self.assign(Lit::new(var, value), level, CRef::UNDEF) {
            Status::Continue => State::Branching(level + 1),
            status => State::Backtracking(level, status),
        }
    }

    /// Assign the pending unit clauses at level 0.
    ///
    /// Returns `false` if the clause set is unsatisfiable.
    fn propagate_units(&mut self) -> bool {
        let mut ok = true;
        let mut i = 0;
        while i < self.units.len() {
            let lit = self.units[i];
            i += 1;
            let value = self.vars.value_lit(lit);
            if value == lbool::TRUE {
                continue;
            } else if value == lbool::FALSE
                || self.assign(lit, 0, CRef::UNDEF) != Status::Continue
            {
                debug!("conflict at level 0 on unit {:?}", lit);
                ok = false;
                break;
            }
        }
        self.units.clear();
        ok
    }

    /// Make `lit` true at `level` and propagate.
    ///
    /// Implied literals are appended to the trail of `level` and processed
    /// in order, starting from `lit`.
    fn assign(&mut self, lit: Lit, level: u32, reason: CRef) -> Status {
        let mut qhead = self.vars.trail[level as usize].len();
        self.vars.assign_lit(lit, level, reason);

        while qhead < self.vars.trail[level as usize].len() {
            let v = self.vars.trail[level as usize][qhead];
            qhead += 1;
            let false_lit = Lit::new(v, self.vars.ass[v] == lbool::FALSE);
            self.stats.propagations += 1;

            if let Some(confl) = self.propagate_lit(false_lit, level) {
                self.stats.conflicts += 1;
                let status = if level == 0 {
                    Status::Conflict
                } else {
                    self.analyze(confl, level)
                };
                debug_assert!(self.check_invariants());
                return status;
            }
        }
        debug_assert!(self.check_invariants());
        Status::Continue
    }

    /// Visit the clauses watching `p`, which just became false.
    /// Returns the conflicting clause, if any.
    fn propagate_lit(&mut self, p: Lit, level: u32) -> Option<CRef> {
        let mut ws = mem::take(&mut self.watches[p]);
        let mut confl = None;
        let mut i = 0;
        let mut j = 0;
        while i < ws.len() {
            let cr = ws[i];
            i += 1;
            match self.visit(cr, p, level) {
                Visit::Moved => (),
                Visit::Resolved | Visit::Implied => {
                    ws[j] = cr;
                    j += 1;
                }
                Visit::Conflict => {
                    ws[j] = cr;
                    j += 1;
                    // keep the rest of the list
                    while i < ws.len() {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                    }
                    confl = Some(cr);
                }
            }
        }
        ws.truncate(j);
        // watches only move to non-false literals
        debug_assert!(self.watches[p].is_empty());
        self.watches[p] = ws;
        confl
    }

    fn visit(&mut self, cr: CRef, p: Lit, level: u32) -> Visit {
        let [w0, w1] = self.db.watched(cr);
        let (slot, other) = if w0 == p {
            (0, w1)
        } else {
            debug_assert_eq!(w1, p, "{:?} does not watch {:?}", cr, p);
            (1, w0)
        };

        let vars = &self.vars;
        let repl = self
            .db
            .lits(cr)
            .iter()
            .copied()
            .find(|&l| l != w0 && l != w1 && vars.value_lit(l) != lbool::FALSE);
        if let Some(l) = repl {
            self.db.set_watched(cr, slot, l);
            self.watches[l].push(cr);
            return Visit::Moved;
        }

        let value = self.vars.value_lit(other);
        if value == lbool::TRUE {
            Visit::Resolved
        } else if value == lbool::FALSE {
            Visit::Conflict
        } else {
            self.vars.assign_lit(other, level, cr);
            Visit::Implied
        }
    }

    /// First-UIP analysis of the conflicting clause `confl` at `level`.
    fn analyze(&mut self, confl: CRef, level: u32) -> Status {
        debug_assert!(level > 0);
        self.tick_decay();

        let mut learnt = self.db.lits(confl).to_vec();
        let uip = loop {
            let mut n_at_level = 0;
            let mut latest: Option<(u32, Lit)> = None;
            for &lit in &learnt {
                let vd = &self.vars.vardata[lit.var()];
                if vd.level == level as i32 {
                    n_at_level += 1;
                    if latest.map_or(true, |(pos, _)| vd.pos > pos) {
                        latest = Some((vd.pos, lit));
                    }
                }
            }
            let (_, pivot) = latest.expect("conflict clause has a literal at the conflict level");
            if n_at_level == 1 {
                break pivot;
            }
            let reason = self.vars.vardata[pivot.var()].reason;
            assert!(
                reason != CRef::UNDEF,
                "decision {:?} reached during conflict analysis",
                pivot
            );
            learnt = clause::resolve(&learnt, self.db.lits(reason), pivot.var());
        };

        // highest level below the conflict level, and its latest literal
        let mut max_exc = 0;
        let mut second: Option<(u32, Lit)> = None;
        for &lit in &learnt {
            if lit == uip {
                continue;
            }
            let vd = &self.vars.vardata[lit.var()];
            let lvl = vd.level as u32;
            if lvl > max_exc || (lvl == max_exc && second.map_or(true, |(pos, _)| vd.pos > pos)) {
                max_exc = lvl;
                second = Some((vd.pos, lit));
            }
        }
        if max_exc == 0 {
            learnt.clear();
            learnt.push(uip);
        }

        if self.max_learnt_len > 0 && learnt.len() > self.max_learnt_len {
            trace!("discard learnt clause of size {}", learnt.len());
            self.stats.discarded += 1;
            return Status::Conflict;
        }

        trace!("learnt clause {}", learnt.pp_dimacs());
        let cr = self.db.alloc(&learnt, true);
        self.stats.learnts += 1;
        for &lit in &learnt {
            self.bump(lit.var());
        }
        match second {
            Some((_, second)) if learnt.len() > 1 => self.attach(cr, uip, second),
            _ => self.units.push(uip),
        }
        Status::BacktrackBy(level - max_exc)
    }

    fn bump(&mut self, v: Var) {
        self.vars.activity[v] += 1;
        let mut heap = self.order_heap_data.promote(VarOrder {
            activity: &self.vars.activity,
        });
        if heap.in_heap(v) {
            heap.decrease(v);
        }
    }

    /// Count a conflict; halve every activity each `decay_interval` conflicts.
    fn tick_decay(&mut self) {
        self.conflicts_since_decay += 1;
        if self.conflicts_since_decay < self.decay_interval {
            return;
        }
        self.conflicts_since_decay = 0;
        for (_, act) in self.vars.activity.iter_mut() {
            *act /= 2;
        }
        // halving creates ties, the heap order must be recomputed
        let ass = &self.vars.ass;
        let unassigned: Vec<Var> = (0..self.vars.num_vars())
            .map(Var::from_idx)
            .filter(|&v| ass[v] == lbool::UNDEF)
            .collect();
        self.order_heap_data
            .promote(VarOrder {
                activity: &self.vars.activity,
            })
            .build(&unassigned);
        self.decayed = true;
    }

    /// Unassigned variable of highest activity, lowest index first.
    fn pick_branch_var(&mut self) -> Option<Var> {
        let mut heap = self.order_heap_data.promote(VarOrder {
            activity: &self.vars.activity,
        });
        while let Some(v) = heap.pop_min() {
            if self.vars.ass[v] == lbool::UNDEF {
                return Some(v);
            }
        }
        None
    }

    /// Undo every assignment of `level`, which must be the last level.
    fn unassign(&mut self, level: u32) {
        assert!(level > 0, "level 0 is never undone");
        assert_eq!(
            self.vars.trail.len(),
            level as usize + 1,
            "can only undo the last level"
        );
        let undone = self.vars.trail.pop().unwrap_or_default();
        for &v in &undone {
            self.vars.ass[v] = lbool::UNDEF;
            self.vars.vardata[v] = VarData::default();
            self.vars.unassigned += 1;
            self.vars.activity[v] += 1;
            let mut heap = self.order_heap_data.promote(VarOrder {
                activity: &self.vars.activity,
            });
            if heap.in_heap(v) {
                heap.decrease(v);
            } else {
                heap.insert(v);
            }
        }
        trace!("undo level {} ({} vars)", level, undone.len());
        debug_assert!(self.check_invariants());
    }

    fn progress(&self, level: u32) -> ProgressStatus {
        ProgressStatus {
            conflicts: self.stats.conflicts,
            decisions: self.stats.decisions,
            n_learnt: self.db.num_learnts() as u64,
            n_clauses: self.db.len() as u32,
            level,
            unassigned: self.vars.unassigned,
        }
    }

    /// The assignment satisfies every clause in the database.
    fn is_model(&self) -> bool {
        self.db.iter_refs().all(|cr| {
            self.db
                .lits(cr)
                .iter()
                .any(|&lit| self.vars.value_lit(lit) == lbool::TRUE)
        })
    }

    fn model(&self) -> Vec<lbool> {
        self.vars.ass.iter().map(|(_, &val)| val).collect()
    }

    /// Check watches, trail and variable table against each other.
    fn check_invariants(&self) -> bool {
        for cr in self.db.iter_refs() {
            let c = self.db.get(cr);
            if c.size() < 2 {
                continue;
            }
            let [w0, w1] = c.watched();
            if w0 == w1 || !c.lits().contains(&w0) || !c.lits().contains(&w1) {
                return false;
            }
            let watched_once =
                |w: Lit| self.watches[w].iter().filter(|&&x| x == cr).count() == 1;
            if !watched_once(w0) || !watched_once(w1) {
                return false;
            }
        }

        let mut assigned = 0;
        for (level, vars) in self.vars.trail.iter().enumerate() {
            for (pos, &v) in vars.iter().enumerate() {
                let vd = self.vars.vardata[v];
                if vd.level != level as i32
                    || vd.pos as usize != pos
                    || self.vars.ass[v] == lbool::UNDEF
                {
                    return false;
                }
                assigned += 1;
            }
        }
        for (v, &val) in self.vars.ass.iter() {
            let vd = self.vars.vardata[v];
            if (val == lbool::UNDEF) != (vd.level == -1) {
                return false;
            }
            let in_heap = self.order_heap_data.in_heap(v);
            if val == lbool::UNDEF && (vd.reason != CRef::UNDEF || !in_heap) {
                return false;
            }
        }
        assigned + self.vars.unassigned == self.vars.num_vars()
    }
}

/// The level below `level` gets `status`; failing past level 1 ends in
/// `Unsat`, any other request goes back to level 0.
fn unwind(level: u32, status: Status) -> State {
    if level > 1 {
        State::Backtracking(level - 1, status)
    } else if status == Status::Conflict {
        State::Unsat
    } else {
        State::Level0Propagation
    }
}

/// Does `model` make every clause true?
fn satisfies(model: &[lbool], clauses: &[Vec<Lit>]) -> bool {
    clauses.iter().all(|c| {
        c.iter()
            .any(|&lit| (model[lit.var().idx() as usize] ^ !lit.sign()) == lbool::TRUE)
    })
}

impl<Cb: Callbacks> SolverInterface for Solver<Cb> {
    fn num_vars(&self) -> u32 {
        self.num_vars
    }
    fn num_clauses(&self) -> u64 {
        self.clauses.len() as u64
    }
    fn num_learnts(&self) -> u64 {
        self.stats.learnts
    }
    fn num_conflicts(&self) -> u64 {
        self.stats.conflicts
    }
    fn num_propagations(&self) -> u64 {
        self.stats.propagations
    }
    fn num_decisions(&self) -> u64 {
        self.stats.decisions
    }

    fn is_ok(&self) -> bool {
        self.ok
    }

    fn print_stats(&self) {
        let s = &self.stats;
        let simp = &self.simp_stats;
        println!("c solves                : {}", s.solves);
        println!("c conflicts             : {:<12}", s.conflicts);
        println!("c decisions             : {:<12}", s.decisions);
        println!("c propagations          : {:<12}", s.propagations);
        println!(
            "c learnt clauses        : {:<12}   ({} discarded)",
            s.learnts, s.discarded
        );
        println!(
            "c simplification        : {} removed, {} subsumed, {} strengthened",
            simp.removed, simp.subsumed, simp.strengthened
        );
        println!("c eliminated vars       : {}", simp.eliminated_vars);
        if s.reruns > 0 {
            println!("c reruns                : {}", s.reruns);
        }
    }

    fn new_var_default(&mut self) -> Var {
        let v = Var::from_idx(self.num_vars);
        self.num_vars += 1;
        v
    }

    fn var_of_int(&mut self, v_idx: u32) -> Var {
        self.num_vars = self.num_vars.max(v_idx + 1);
        Var::from_idx(v_idx)
    }

    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        if !self.ok {
            return false;
        }
        if !clause::normalize(clause) {
            trace!("drop tautology {:?}", clause);
            return true;
        }
        match clause.last() {
            None => {
                debug!("empty clause added");
                self.ok = false;
                false
            }
            Some(&max_lit) => {
                // sorted: the last literal has the highest variable
                self.var_of_int(max_lit.var().idx());
                self.clauses.push(clause.clone());
                true
            }
        }
    }

    fn solve_limited(&mut self) -> lbool {
        self.solve_internal()
    }

    fn get_model(&self) -> &[lbool] {
        &self.model
    }

    #[inline]
    fn value_var(&self, v: Var) -> lbool {
        self.model
            .get(v.idx() as usize)
            .copied()
            .unwrap_or(lbool::UNDEF)
    }

    #[inline]
    fn value_lit(&self, lit: Lit) -> lbool {
        self.value_var(lit.var()) ^ !lit.sign()
    }
}

impl<Cb: Callbacks + Default> Default for Solver<Cb> {
    fn default() -> Self {
        Solver::new(SolverOpts::default(), Default::default())
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Create a new solver with the given options and callbacks.
    ///
    /// Panics if `opts.check()` fails.
    pub fn new(opts: SolverOpts, cb: Cb) -> Self {
        assert!(opts.check(), "invalid solver options {:?}", opts);
        Self {
            model: vec![],
            cb,
            clauses: vec![],
            num_vars: 0,
            ok: true,
            opts,
            stats: Stats::default(),
            simp_stats: SimpStats::default(),
        }
    }

    pub fn cb(&self) -> &Cb {
        &self.cb
    }

    pub fn cb_mut(&mut self) -> &mut Cb {
        &mut self.cb
    }

    pub fn opts(&self) -> &SolverOpts {
        &self.opts
    }

    /// Statistics of the last preprocessing pass.
    pub fn simp_stats(&self) -> SimpStats {
        self.simp_stats
    }

    /// Number of times the search was restarted on the input clauses
    /// because the model of the simplified clauses did not satisfy them.
    pub fn num_reruns(&self) -> u64 {
        self.stats.reruns
    }

    /// Number of learnt clauses dropped for exceeding `max_learnt_len`.
    pub fn num_discarded(&self) -> u64 {
        self.stats.discarded
    }

    /// The input clauses, normalized.
    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Print the model as DIMACS (`v 1 -2 … 0`).
    pub fn dimacs_model(&self) -> SolverPrintDimacs<Cb> {
        SolverPrintDimacs { s: self }
    }

    fn solve_internal(&mut self) -> lbool {
        self.model.clear();
        if !self.ok {
            return lbool::FALSE;
        }
        self.stats.solves += 1;
        self.cb.on_start();

        let clauses = mem::take(&mut self.clauses);
        let res = self.solve_clauses(&clauses);
        self.clauses = clauses;

        self.cb.on_result(res);
        if res == lbool::FALSE {
            self.ok = false;
        }
        res
    }

    fn solve_clauses(&mut self, clauses: &[Vec<Lit>]) -> lbool {
        if !self.opts.preprocess {
            return self.search_clauses(clauses);
        }

        let mut simp = Simplifier::new(self.num_vars, clauses.to_vec(), self.opts.elim_occ_limit);
        let simp_res = simp.run();
        self.simp_stats = simp.stats();
        self.cb.on_simplify(&self.simp_stats);
        if simp_res.is_err() {
            debug!("simplification proved unsat");
            return lbool::FALSE;
        }
        let reduced = simp.into_reduced();
        info!(
            "simplified {} clauses into {}",
            clauses.len(),
            reduced.len()
        );

        let res = self.search_clauses(&reduced);
        if res == lbool::TRUE && !satisfies(&self.model, clauses) {
            debug!("model of the simplified clauses is not a model, solve again");
            self.stats.reruns += 1;
            return self.search_clauses(clauses);
        }
        res
    }

    fn search_clauses(&mut self, clauses: &[Vec<Lit>]) -> lbool {
        let mut search = Search::new(self.num_vars, clauses, &self.opts, &mut self.stats);
        let res = search.run(&mut self.cb);
        if res == lbool::TRUE {
            self.model = search.model();
        }
        res
    }
}

/// Print the model as DIMACS
pub struct SolverPrintDimacs<'a, Cb: Callbacks + 'a> {
    s: &'a Solver<Cb>,
}

impl<'a, Cb: Callbacks> fmt::Display for SolverPrintDimacs<'a, Cb> {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "v ")?;
        for (i, &val) in self.s.model.iter().enumerate() {
            if val == lbool::TRUE {
                write!(out, "{} ", i + 1)?
            } else if val == lbool::FALSE {
                write!(out, "-{} ", i + 1)?
            }
        }
        write!(out, "0")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SolverOpts {
    /// Longest learnt clause kept; longer ones are dropped and the
    /// conflict is treated as a plain branch failure. `0` keeps them all.
    pub max_learnt_len: u32,
    /// Activities are halved every `decay_interval` conflicts.
    pub decay_interval: u32,
    /// Variables with more occurrences than this, in either polarity, are
    /// never eliminated. `0` disables variable elimination.
    pub elim_occ_limit: u32,
    /// Simplify the clauses before search.
    pub preprocess: bool,
}

impl Default for SolverOpts {
    fn default() -> SolverOpts {
        Self {
            max_learnt_len: 9,
            decay_interval: 50,
            elim_occ_limit: 10,
            preprocess: true,
        }
    }
}

impl SolverOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        self.decay_interval >= 1
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::callbacks::Basic;

    fn lit(i: i32) -> Lit {
        Lit::from_dimacs(i).unwrap()
    }

    fn var(i: u32) -> Var {
        Var::from_idx(i - 1)
    }

    fn clauses(cs: &[&[i32]]) -> Vec<Vec<Lit>> {
        cs.iter()
            .map(|c| {
                let mut c: Vec<Lit> = c.iter().map(|&i| lit(i)).collect();
                clause::normalize(&mut c);
                c
            })
            .collect()
    }

    #[test]
    fn test_propagation_chain() {
        let cs = clauses(&[&[-1, 2], &[-2, 3]]);
        let mut stats = Stats::default();
        let mut s = Search::new(3, &cs, &SolverOpts::default(), &mut stats);
        assert!(s.propagate_units());

        assert_eq!(s.decide(1, var(1), true), State::Branching(2));
        assert_eq!(s.vars.trail[1], vec![var(1), var(2), var(3)]);
        assert_eq!(s.vars.unassigned, 0);
        let vd = s.vars.vardata[var(3)];
        assert_eq!((vd.level, vd.pos), (1, 2));
        assert_eq!(vd.reason, s.db.iter_refs().nth(1).unwrap());
        assert_eq!(s.vars.vardata[var(1)].reason, CRef::UNDEF);
        assert!(s.check_invariants());
        assert!(s.is_model());
    }

    #[test]
    fn test_watch_moves_to_unassigned_literal() {
        let cs = clauses(&[&[-1, -2, 3]]);
        let mut stats = Stats::default();
        let mut s = Search::new(3, &cs, &SolverOpts::default(), &mut stats);
        let cr = s.db.iter_refs().next().unwrap();
        assert_eq!(s.db.watched(cr), [lit(-1), lit(-2)]);

        assert_eq!(s.decide(1, var(1), true), State::Branching(2));
        assert_eq!(s.db.watched(cr), [lit(3), lit(-2)]);
        assert!(s.watches[lit(-1)].is_empty());
        assert_eq!(s.watches[lit(3)], vec![cr]);
        assert_eq!(s.vars.unassigned, 2);
    }

    #[test]
    fn test_unassign_is_exact() {
        // each decision implies one more variable, x7 needs levels 2 and 3
        let cs = clauses(&[&[-1, 2], &[-3, 4], &[-5, 6], &[-4, -6, 7]]);
        let mut stats = Stats::default();
        let mut s = Search::new(7, &cs, &SolverOpts::default(), &mut stats);
        assert!(s.propagate_units());

        let snapshot = |s: &Search| {
            (
                s.vars.ass.clone(),
                s.vars.vardata.clone(),
                s.vars.trail.clone(),
                s.vars.unassigned,
            )
        };
        assert_eq!(s.decide(1, var(1), true), State::Branching(2));
        let at_level1 = snapshot(&s);
        assert_eq!(s.decide(2, var(3), true), State::Branching(3));
        let at_level2 = snapshot(&s);
        assert_eq!(s.decide(3, var(5), true), State::Branching(4));
        assert_eq!(s.vars.unassigned, 0);
        assert_eq!(s.vars.trail[3], vec![var(5), var(6), var(7)]);
        assert_eq!(s.vars.vardata[var(7)].level, 3);

        s.unassign(3);
        assert!(snapshot(&s) == at_level2);
        s.unassign(2);
        assert!(snapshot(&s) == at_level1);
        assert!(s.check_invariants());

        for i in 3..=7 {
            assert!(s.order_heap_data.in_heap(var(i)));
            assert_eq!(s.vars.activity[var(i)], 1, "undone vars are bumped");
        }
        assert_eq!(s.vars.activity[var(1)], 0);

        // the same levels again, with the same propagations
        assert_eq!(s.decide(2, var(3), true), State::Branching(3));
        assert!(snapshot(&s) == at_level2);
    }

    // x1@1, x2@2 implies x3 and x4, which falsify (¬x3 ∨ ¬x4)
    const UIP_CLAUSES: &[&[i32]] = &[&[-1, -2, 3], &[-2, -3, 4], &[-3, -4]];

    #[test]
    fn test_first_uip() {
        let cs = clauses(UIP_CLAUSES);
        let mut stats = Stats::default();
        {
            let mut s = Search::new(4, &cs, &SolverOpts::default(), &mut stats);
            assert_eq!(s.decide(1, var(1), true), State::Branching(2));
            assert_eq!(s.decide(2, var(2), true), State::Backtracking(2, Status::BacktrackBy(1)));

            let learnt = s.db.iter_refs().last().unwrap();
            assert!(s.db.get(learnt).learnt());
            assert_eq!(s.db.lits(learnt), &[lit(-1), lit(-2)][..]);
            assert_eq!(s.db.watched(learnt), [lit(-2), lit(-1)]);
            assert!(s.check_invariants());
            assert_eq!(s.vars.activity[var(1)], 1);
            assert_eq!(s.vars.activity[var(2)], 1);
            assert_eq!(s.vars.activity[var(3)], 0);

            // back to level 1, whose decision now implies ¬x2
            s.unassign(2);
            s.unassign(1);
            assert_eq!(s.decide(1, var(1), true), State::Branching(2));
            assert_eq!(s.vars.ass[var(2)], lbool::FALSE);
            assert_eq!(s.vars.vardata[var(2)].reason, learnt);
        }
        assert_eq!(stats.learnts, 1);
        assert_eq!(stats.conflicts, 1);
    }

    #[test]
    fn test_check_invariants_detects_corruption() {
        let cs = clauses(&[&[-1, -2, 3]]);
        let mut stats = Stats::default();
        let mut s = Search::new(3, &cs, &SolverOpts::default(), &mut stats);
        assert_eq!(s.decide(1, var(1), true), State::Branching(2));
        assert!(s.check_invariants());

        let cr = s.db.iter_refs().next().unwrap();
        assert_eq!(s.watches[lit(3)], vec![cr]);
        s.watches[lit(3)].push(cr);
        assert!(!s.check_invariants());
        s.watches[lit(3)].pop();
        assert!(s.check_invariants());
        s.vars.vardata[var(1)].pos = 3;
        assert!(!s.check_invariants());
    }

    #[test]
    fn test_learnt_clause_cap() {
        let cs = clauses(UIP_CLAUSES);
        let opts = SolverOpts {
            max_learnt_len: 1,
            ..SolverOpts::default()
        };
        let mut stats = Stats::default();
        {
            let mut s = Search::new(4, &cs, &opts, &mut stats);
            s.decide(1, var(1), true);
            assert_eq!(s.decide(2, var(2), true), State::Backtracking(2, Status::Conflict));
            assert_eq!(s.db.num_learnts(), 0);
        }
        assert_eq!(stats.discarded, 1);
    }

    #[test]
    fn test_learnt_unit() {
        let cs = clauses(&[&[-1, 2], &[-1, -2]]);
        let mut stats = Stats::default();
        let mut s = Search::new(2, &cs, &SolverOpts::default(), &mut stats);
        assert_eq!(s.decide(1, var(1), true), State::Backtracking(1, Status::BacktrackBy(1)));
        assert_eq!(s.units, vec![lit(-1)]);
        assert_eq!(unwind(1, Status::BacktrackBy(0)), State::Level0Propagation);

        s.unassign(1);
        assert!(s.propagate_units());
        assert_eq!(s.vars.ass[var(1)], lbool::FALSE);
        assert_eq!(s.vars.trail[0], vec![var(1)]);
    }

    #[test]
    fn test_level0_conflict() {
        let cs = clauses(&[&[1, 2], &[-1, 2], &[-2]]);
        let mut stats = Stats::default();
        {
            let mut s = Search::new(2, &cs, &SolverOpts::default(), &mut stats);
            assert!(!s.propagate_units());
        }
        let mut s = Search::new(2, &cs, &SolverOpts::default(), &mut stats);
        assert_eq!(s.run(&mut Basic::new()), lbool::FALSE);
        assert_eq!(s.stats.decisions, 0);
    }

    #[test]
    fn test_vsids_tie_break() {
        let mut stats = Stats::default();
        let mut s = Search::new(4, &[], &SolverOpts::default(), &mut stats);
        assert_eq!(s.pick_branch_var(), Some(var(1)));
        assert_eq!(s.pick_branch_var(), Some(var(2)));

        let mut stats = Stats::default();
        let mut s = Search::new(4, &[], &SolverOpts::default(), &mut stats);
        s.bump(var(3));
        s.bump(var(2));
        assert_eq!(s.pick_branch_var(), Some(var(2)));
        s.bump(var(3));
        assert_eq!(s.pick_branch_var(), Some(var(3)));
    }

    #[test]
    fn test_decay_halves_activities() {
        let opts = SolverOpts {
            decay_interval: 2,
            ..SolverOpts::default()
        };
        let mut stats = Stats::default();
        let mut s = Search::new(3, &[], &opts, &mut stats);
        for _ in 0..5 {
            s.bump(var(1));
        }
        for _ in 0..3 {
            s.bump(var(2));
        }
        s.tick_decay();
        assert!(!s.decayed);
        s.tick_decay();
        assert!(s.decayed);
        assert_eq!(s.vars.activity[var(1)], 2);
        assert_eq!(s.vars.activity[var(2)], 1);
        assert_eq!(s.vars.activity[var(3)], 0);
        assert_eq!(s.pick_branch_var(), Some(var(1)));
    }

    #[test]
    fn test_false_is_tried_first() {
        let mut solver: Solver<Basic> = Solver::default();
        let mut c = vec![lit(1), lit(2)];
        solver.add_clause_reuse(&mut c);
        assert_eq!(solver.solve_limited(), lbool::TRUE);
        assert_eq!(solver.value_var(var(1)), lbool::FALSE);
        assert_eq!(solver.value_var(var(2)), lbool::TRUE);
        assert_eq!(format!("{}", solver.dimacs_model()), "v -1 2 0");
    }

    #[test]
    fn test_rerun_after_elimination() {
        let mut solver: Solver<Basic> = Solver::default();
        for c in clauses(&[&[1, 2], &[-1, 3]]) {
            let mut c = c;
            assert!(solver.add_clause_reuse(&mut c));
        }
        assert_eq!(solver.solve_limited(), lbool::TRUE);
        assert_eq!(solver.simp_stats().eliminated_vars, 1);
        assert_eq!(solver.num_reruns(), 1);
        assert!(satisfies(solver.get_model(), solver.clauses()));
    }

    #[test]
    fn test_tautology_and_empty_clause() {
        let mut solver: Solver<Basic> = Solver::default();
        assert!(solver.add_clause_reuse(&mut vec![lit(1), lit(-1)]));
        assert_eq!(solver.num_clauses(), 0);
        assert!(!solver.add_clause_reuse(&mut vec![]));
        assert!(!solver.is_ok());
        assert_eq!(solver.solve_limited(), lbool::FALSE);
        assert_eq!(solver.num_decisions(), 0);
    }

    #[test]
    fn test_opts_check() {
        assert!(SolverOpts::default().check());
        let opts = SolverOpts {
            decay_interval: 0,
            ..SolverOpts::default()
        };
        assert!(!opts.check());
    }
}
