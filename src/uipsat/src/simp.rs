/*****************************************************************************************[simp.rs]
Copyright (c) 2006,      Niklas Een, Niklas Sorensson (MiniSat)
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

//! Clause set preprocessing.
//!
//! The `Simplifier` rewrites a clause set into an equisatisfiable, usually
//! smaller, one using subsumption, self-subsuming resolution, unit
//! propagation and bounded variable elimination. Each step feeds the
//! worklists of the others, and the pass stops at the common fixpoint.
//!
//! A model of the output is not necessarily a model of the input: the
//! values of eliminated variables are lost.

use {
    crate::clause::{self, DeletePred, Lit, OccListsData, Var},
    crate::intmap::{IntMapBool, IntSet},
};

/// The clause set has no model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unsat;

/// Counters for one preprocessing pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpStats {
    /// Clauses removed because another clause is a subset of them.
    pub subsumed: u64,
    /// Literals removed from clauses.
    pub strengthened: u64,
    /// Unit clauses propagated.
    pub units: u64,
    pub eliminated_vars: u64,
    /// Clauses added by variable elimination.
    pub resolvents: u64,
    /// Clauses removed for any reason.
    pub removed: u64,
}

/// Clause index in the simplifier's clause vector
pub type ClauseIdx = usize;

/// Tells occurrence lists which clause indices are gone
struct ClauseRemoved<'a>(&'a [bool]);

impl<'a> DeletePred<ClauseIdx> for ClauseRemoved<'a> {
    #[inline]
    fn deleted(&self, c: &ClauseIdx) -> bool {
        self.0[*c]
    }
}

pub struct Simplifier {
    clauses: Vec<Vec<Lit>>,
    removed: Vec<bool>,
    occs: OccListsData<Lit, ClauseIdx>,

    // worklists
    added: Vec<ClauseIdx>,
    strengthened: Vec<ClauseIdx>,
    units: Vec<ClauseIdx>,
    touched: IntSet<Var>,

    eliminated: IntMapBool<Var>,
    elim_occ_limit: usize,
    empty_clause: bool,
    stats: SimpStats,
}

impl Simplifier {
    /// Prepare to simplify `clauses`, over variables `0..num_vars`.
    ///
    /// Variables with more than `elim_occ_limit` positive or negative
    /// occurrences are never eliminated; `0` disables elimination.
    pub fn new(num_vars: u32, clauses: Vec<Vec<Lit>>, elim_occ_limit: u32) -> Self {
        let num_vars = clauses
            .iter()
            .flat_map(|c| c.iter())
            .map(|lit| lit.var().idx() + 1)
            .fold(num_vars, u32::max);

        let mut occs = OccListsData::new();
        let mut eliminated = IntMapBool::new();
        for i in 0..num_vars {
            let v = Var::from_idx(i);
            occs.init(Lit::new(v, true));
            occs.init(Lit::new(v, false));
            eliminated.reserve(v);
        }

        let mut simp = Simplifier {
            clauses: Vec::with_capacity(clauses.len()),
            removed: Vec::with_capacity(clauses.len()),
            occs,
            added: vec![],
            strengthened: vec![],
            units: vec![],
            touched: IntSet::new(),
            eliminated,
            elim_occ_limit: elim_occ_limit as usize,
            empty_clause: false,
            stats: SimpStats::default(),
        };
        for mut c in clauses {
            if clause::normalize(&mut c) {
                simp.push_clause(c);
            }
        }
        simp
    }

    pub fn stats(&self) -> SimpStats {
        self.stats
    }

    /// All clauses, removed ones included, indexed by `ClauseIdx`.
    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    pub fn is_removed(&self, c: ClauseIdx) -> bool {
        self.removed[c]
    }

    pub fn is_eliminated(&self, v: Var) -> bool {
        self.eliminated.get(v)
    }

    /// The clauses that survived simplification.
    pub fn into_reduced(self) -> Vec<Vec<Lit>> {
        let removed = self.removed;
        self.clauses
            .into_iter()
            .zip(removed)
            .filter_map(|(c, r)| if r { None } else { Some(c) })
            .collect()
    }

    /// Run until every worklist is empty.
    ///
    /// Returns the indices of the removed clauses; clauses produced by
    /// elimination are appended to `clauses()`.
    pub fn run(&mut self) -> Result<Vec<ClauseIdx>, Unsat> {
        if self.empty_clause {
            return Err(Unsat);
        }
        loop {
            if let Some(c) = self.units.pop() {
                self.propagate_unit(c)?;
            } else if let Some(c) = self.strengthened.pop() {
                self.subsume_with(c)?;
            } else if let Some(c) = self.added.pop() {
                self.subsume_with(c)?;
            } else if let Some(v) = self.touched.pop() {
                self.eliminate_var(v)?;
            } else {
                break;
            }
        }
        debug!("simplification done: {:?}", self.stats);

        Ok((0..self.clauses.len()).filter(|&c| self.removed[c]).collect())
    }

    fn push_clause(&mut self, c: Vec<Lit>) -> ClauseIdx {
        let idx = self.clauses.len();
        for &lit in &c {
            self.occs[lit].push(idx);
            self.touched.insert(lit.var());
        }
        match c.len() {
            0 => self.empty_clause = true,
            1 => self.units.push(idx),
            _ => (),
        }
        self.added.push(idx);
        self.clauses.push(c);
        self.removed.push(false);
        idx
    }

    /// Up-to-date copy of the occurrences of `lit`.
    fn occ_list(&mut self, lit: Lit) -> Vec<ClauseIdx> {
        self.occs
            .lookup_mut_pred(lit, &ClauseRemoved(&self.removed))
            .clone()
    }

    fn num_occs(&mut self, lit: Lit) -> usize {
        self.occs
            .lookup_mut_pred(lit, &ClauseRemoved(&self.removed))
            .len()
    }

    fn remove_clause(&mut self, c: ClauseIdx) {
        if self.removed[c] {
            return;
        }
        trace!("simp: remove clause {:?}", self.clauses[c]);
        self.removed[c] = true;
        self.stats.removed += 1;
        for &lit in &self.clauses[c] {
            self.occs.smudge(lit);
            self.touched.insert(lit.var());
        }
    }

    /// Remove `lit` from clause `c`.
    fn strengthen(&mut self, c: ClauseIdx, lit: Lit) -> Result<(), Unsat> {
        match self.clauses[c].binary_search(&lit) {
            Ok(i) => {
                self.clauses[c].remove(i);
            }
            Err(_) => return Ok(()),
        }
        let occ = &mut self.occs[lit];
        if let Some(i) = occ.iter().position(|&x| x == c) {
            occ.swap_remove(i);
        }
        self.stats.strengthened += 1;
        self.touched.insert(lit.var());
        trace!("simp: strengthened into {:?}", self.clauses[c]);

        match self.clauses[c].len() {
            0 => Err(Unsat),
            1 => {
                self.units.push(c);
                Ok(())
            }
            _ => {
                self.strengthened.push(c);
                Ok(())
            }
        }
    }

    /// Top-level propagation of the unit clause `c`.
    fn propagate_unit(&mut self, c: ClauseIdx) -> Result<(), Unsat> {
        if self.removed[c] || self.clauses[c].len() != 1 {
            return Ok(());
        }
        let unit = self.clauses[c][0];
        self.stats.units += 1;

        for d in self.occ_list(unit) {
            if d != c {
                self.remove_clause(d);
            }
        }
        for d in self.occ_list(!unit) {
            self.strengthen(d, !unit)?;
        }
        Ok(())
    }

    /// Use `c` to remove the clauses it subsumes, and to strengthen
    /// the clauses it self-subsumes.
    fn subsume_with(&mut self, c: ClauseIdx) -> Result<(), Unsat> {
        if self.removed[c] || self.clauses[c].is_empty() {
            return Ok(());
        }
        let lits = self.clauses[c].clone();

        // every superset of `c` contains its rarest literal
        let mut best = lits[0];
        let mut best_n = usize::MAX;
        for &lit in &lits {
            let n = self.num_occs(lit);
            if n < best_n {
                best = lit;
                best_n = n;
            }
        }
        for d in self.occ_list(best) {
            if d != c && !self.removed[d] && is_subset(&lits, &self.clauses[d], None) {
                self.stats.subsumed += 1;
                self.remove_clause(d);
            }
        }

        // `c = l ∨ C'` and `d = ¬l ∨ D'` with `C' ⊆ D'` resolve into `D'`
        for &lit in &lits {
            for d in self.occ_list(!lit) {
                if !self.removed[d] && is_subset(&lits, &self.clauses[d], Some(lit)) {
                    self.strengthen(d, !lit)?;
                }
            }
        }
        Ok(())
    }

    /// Replace the clauses containing `v` by their resolvents on `v`, unless
    /// that makes the clause set grow.
    fn eliminate_var(&mut self, v: Var) -> Result<(), Unsat> {
        if self.eliminated.get(v) {
            return Ok(());
        }
        let pos_lit = Lit::new(v, true);
        let (n_pos, n_neg) = (self.num_occs(pos_lit), self.num_occs(!pos_lit));
        if n_pos == 0 || n_neg == 0 || n_pos > self.elim_occ_limit || n_neg > self.elim_occ_limit {
            return Ok(());
        }
        let pos = self.occ_list(pos_lit);
        let neg = self.occ_list(!pos_lit);

        let bound = n_pos + n_neg;
        let mut resolvents = vec![];
        for &p in &pos {
            for &n in &neg {
                let r = clause::resolve(&self.clauses[p], &self.clauses[n], v);
                if clause::is_tautology(&r) {
                    continue;
                }
                resolvents.push(r);
                if resolvents.len() > bound {
                    trace!("simp: keep {:?}, too many resolvents", v);
                    return Ok(());
                }
            }
        }

        debug!(
            "simp: eliminate {:?} ({} clauses, {} resolvents)",
            v,
            bound,
            resolvents.len()
        );
        for &c in pos.iter().chain(neg.iter()) {
            self.remove_clause(c);
        }
        self.eliminated.insert(v);
        self.stats.eliminated_vars += 1;
        for r in resolvents {
            if r.is_empty() {
                return Err(Unsat);
            }
            self.stats.resolvents += 1;
            self.push_clause(r);
        }
        Ok(())
    }
}

/// Is `c` minus `except` a subset of `d`? `d` must be sorted.
fn is_subset(c: &[Lit], d: &[Lit], except: Option<Lit>) -> bool {
    let extra = except.map_or(0, |_| 1);
    if c.len() > d.len() + extra {
        return false;
    }
    c.iter()
        .filter(|&&lit| Some(lit) != except)
        .all(|lit| d.binary_search(lit).is_ok())
}

#[cfg(test)]
mod test {
    use super::*;

    fn clauses(cs: &[&[i32]]) -> Vec<Vec<Lit>> {
        cs.iter()
            .map(|c| c.iter().map(|&i| Lit::from_dimacs(i).unwrap()).collect())
            .collect()
    }

    fn simplify(cs: &[&[i32]], elim_occ_limit: u32) -> (Result<Vec<usize>, Unsat>, Simplifier) {
        let mut simp = Simplifier::new(0, clauses(cs), elim_occ_limit);
        let res = simp.run();
        (res, simp)
    }

    #[test]
    fn test_subsumption() {
        let (res, simp) = simplify(&[&[1, 2, 3], &[1, 2], &[2, 4]], 0);
        assert_eq!(res, Ok(vec![0]));
        assert_eq!(simp.stats().subsumed, 1);
        assert_eq!(simp.into_reduced(), clauses(&[&[1, 2], &[2, 4]]));
    }

    #[test]
    fn test_duplicate_clauses() {
        let (res, simp) = simplify(&[&[1, -2], &[-2, 1]], 0);
        assert_eq!(res.map(|r| r.len()), Ok(1));
        assert_eq!(simp.into_reduced(), clauses(&[&[1, -2]]));
    }

    #[test]
    fn test_self_subsumption() {
        let (res, simp) = simplify(&[&[1, 2], &[-1, 2, 3]], 0);
        assert_eq!(res, Ok(vec![]));
        assert_eq!(simp.stats().strengthened, 1);
        assert_eq!(simp.clauses()[1], clauses(&[&[2, 3]])[0]);
    }

    #[test]
    fn test_unit_propagation() {
        let (res, simp) = simplify(&[&[1], &[1, 2], &[-1, 3], &[-3, 4, 5]], 0);
        assert!(res.is_ok());
        let reduced = simp.into_reduced();
        assert_eq!(reduced, clauses(&[&[1], &[3], &[4, 5]]));
    }

    #[test]
    fn test_unit_conflict() {
        let (res, _) = simplify(&[&[1, 2], &[-2], &[-1, 2]], 0);
        assert_eq!(res, Err(Unsat));
        let (res, _) = simplify(&[&[1], &[-1]], 10);
        assert_eq!(res, Err(Unsat));
    }

    #[test]
    fn test_empty_clause() {
        let (res, _) = simplify(&[&[1, 2], &[]], 10);
        assert_eq!(res, Err(Unsat));
    }

    #[test]
    fn test_variable_elimination() {
        let (res, simp) = simplify(&[&[1, 2], &[-1, 3]], 10);
        assert_eq!(res, Ok(vec![0, 1]));
        assert!(simp.is_eliminated(Var::from_idx(0)));
        assert_eq!(simp.stats().eliminated_vars, 1);
        assert_eq!(simp.stats().resolvents, 1);
        assert_eq!(simp.into_reduced(), clauses(&[&[2, 3]]));
    }

    #[test]
    fn test_elimination_skips_tautologies() {
        // every resolvent is a tautology
        let (res, simp) = simplify(&[&[1, 2], &[-1, -2]], 10);
        assert!(res.is_ok());
        assert_eq!(simp.stats().resolvents, 0);
        assert!(simp.into_reduced().is_empty());
    }

    #[test]
    fn test_elimination_blowup_guard() {
        // 9 resolvents on x1 for 6 clauses
        let cs: &[&[i32]] = &[&[1, 2], &[1, 3], &[1, 4], &[-1, 5], &[-1, 6], &[-1, 7]];
        let (res, simp) = simplify(cs, 10);
        assert_eq!(res, Ok(vec![]));
        assert_eq!(simp.stats().eliminated_vars, 0);
        assert_eq!(simp.into_reduced().len(), 6);
    }

    #[test]
    fn test_elimination_occurrence_limit() {
        let cs: &[&[i32]] = &[&[1, 2], &[1, 3], &[-1, 4]];
        let (_, simp) = simplify(cs, 1);
        assert_eq!(simp.stats().eliminated_vars, 0);
        let (_, simp) = simplify(cs, 2);
        assert_eq!(simp.stats().eliminated_vars, 1);
    }

    #[test]
    fn test_is_subset() {
        let c = &clauses(&[&[1, 2, 5], &[-1, 2, 3, 5]]);
        assert!(!is_subset(&c[0], &c[1], None));
        assert!(is_subset(&c[0], &c[1], Some(Lit::from_dimacs(1).unwrap())));
        assert!(is_subset(&c[0], &c[0], None));
    }
}
