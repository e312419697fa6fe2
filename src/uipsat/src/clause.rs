/*****************************************************************************************[clause.rs]
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
    crate::{
        alloc::{self, RegionAllocator},
        intmap::{AsIndex, IntMap, IntMapBool},
    },
    std::{fmt, ops},
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var(u32);

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == !0 {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}", self.0 + 1)
        }
    }
}

impl Var {
    pub const UNDEF: Var = Var(!0);
    #[inline(always)]
    pub(crate) fn from_idx(idx: u32) -> Self {
        debug_assert!(idx < u32::MAX / 2, "Var::from_idx: index too large");
        Var(idx)
    }
    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }
}

impl AsIndex for Var {
    fn as_index(self) -> usize {
        self.0 as usize
    }
    fn from_index(index: usize) -> Self {
        Var(index as u32)
    }
}

pub type VMap<V> = IntMap<Var, V>;

/// A literal: a variable with a sign (`sign() == true` for the positive literal).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit(u32);

impl Lit {
    pub const UNDEF: Lit = Lit(!1);

    #[inline(always)]
    pub fn new(var: Var, sign: bool) -> Self {
        Lit(var.0 * 2 + (!sign) as u32)
    }
    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }
    #[inline(always)]
    pub fn sign(&self) -> bool {
        (self.0 & 1) == 0
    }
    #[inline(always)]
    pub fn var(&self) -> Var {
        Var(self.0 >> 1)
    }

    /// Literal from its DIMACS form (`3` is `x3`, `-3` is `¬x3`).
    ///
    /// Returns `None` for `0`, which is never a literal.
    ///
    /// ```
    /// use uipsat::Lit;
    /// let l = Lit::from_dimacs(-3).unwrap();
    /// assert!(!l.sign());
    /// assert_eq!(l.var().idx(), 2);
    /// assert_eq!(l.to_dimacs(), -3);
    /// assert!(Lit::from_dimacs(0).is_none());
    /// ```
    pub fn from_dimacs(i: i32) -> Option<Lit> {
        if i == 0 {
            None
        } else {
            let var = Var::from_idx(i.unsigned_abs() - 1);
            Some(Lit::new(var, i > 0))
        }
    }

    /// Signed integer form of the literal, as in DIMACS.
    pub fn to_dimacs(&self) -> i32 {
        let v = self.var().idx() as i32 + 1;
        if self.sign() {
            v
        } else {
            -v
        }
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == !1 {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}{:?}", if self.sign() { "" } else { "-" }, self.var())
        }
    }
}

impl ops::Not for Lit {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Lit(self.0 ^ 1)
    }
}

impl AsIndex for Lit {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        Lit(index as u32)
    }
}

pub type LMap<V> = IntMap<Lit, V>;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy)]
/// A ternary boolean (true, false, undefined) used for partial assignments.
pub struct lbool(u8);

impl fmt::Debug for lbool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            0 => write!(f, "TRUE"),
            1 => write!(f, "FALSE"),
            _ => write!(f, "UNDEF"),
        }
    }
}

impl Default for lbool {
    fn default() -> Self {
        lbool::UNDEF
    }
}

impl lbool {
    pub const TRUE: lbool = lbool(0);
    pub const FALSE: lbool = lbool(1);
    pub const UNDEF: lbool = lbool(2);
    #[inline(always)]
    pub fn new(v: bool) -> Self {
        lbool((!v) as u8)
    }
    pub fn from_u8(v: u8) -> Self {
        debug_assert!(v == (v & 3), "lbool::from_u8: invalid value");
        lbool(v)
    }
}

// two undefined values are equal, whatever their exact bits
impl PartialEq for lbool {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0 || (self.0 & rhs.0 & 2) != 0
    }
}

impl Eq for lbool {}

impl ops::Neg for lbool {
    type Output = lbool;
    fn neg(self) -> Self {
        lbool(self.0 ^ 1)
    }
}

impl ops::BitXor<bool> for lbool {
    type Output = lbool;

    /// Flips the value if `rhs` is true. `UNDEF` stays undefined.
    fn bitxor(self, rhs: bool) -> Self {
        lbool(self.0 ^ rhs as u8)
    }
}

impl From<bool> for lbool {
    fn from(x: bool) -> Self {
        lbool::new(x)
    }
}

/// Index of a clause in a `ClauseDb`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CRef(u32);

impl CRef {
    /// Antecedent of decisions and unassigned variables.
    pub const UNDEF: CRef = CRef(!0);

    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for CRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if *self == CRef::UNDEF {
            write!(f, "c_UNDEF")
        } else {
            write!(f, "c{}", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClauseHeader {
    start: alloc::Ref<Lit>,
    size: u32,
    learnt: bool,
    /// The two watched literals; `Lit::UNDEF` for unit clauses.
    watched: [Lit; 2],
}

/// Append-only clause store.
///
/// Literals of all clauses live in a single arena; clauses are addressed by
/// `CRef`, their position in the store. Input clauses come first, learnt
/// clauses are appended after them.
#[derive(Debug, Clone)]
pub struct ClauseDb {
    lits: RegionAllocator<Lit>,
    headers: Vec<ClauseHeader>,
    num_learnts: u32,
}

/// A reference to some clause
#[derive(Debug, Clone, Copy)]
pub struct ClauseRef<'a> {
    header: ClauseHeader,
    lits: &'a [Lit],
}

impl<'a> ClauseRef<'a> {
    #[inline(always)]
    pub fn lits(&self) -> &'a [Lit] {
        self.lits
    }
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.header.size
    }
    #[inline(always)]
    pub fn learnt(&self) -> bool {
        self.header.learnt
    }
    #[inline(always)]
    pub fn watched(&self) -> [Lit; 2] {
        self.header.watched
    }
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a Lit> {
        self.lits.iter()
    }
}

impl ClauseDb {
    pub fn new() -> Self {
        Self::with_start_cap(1024)
    }

    pub fn with_start_cap(start_cap: u32) -> Self {
        ClauseDb {
            lits: RegionAllocator::new(start_cap),
            headers: vec![],
            num_learnts: 0,
        }
    }

    /// Number of clauses, learnt ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    #[inline]
    pub fn num_learnts(&self) -> u32 {
        self.num_learnts
    }

    /// Total number of literals stored.
    #[inline]
    pub fn num_lits(&self) -> u32 {
        self.lits.len()
    }

    /// Append a clause. Its watches are left undefined.
    pub fn alloc(&mut self, clause: &[Lit], learnt: bool) -> CRef {
        let cr = CRef(self.headers.len() as u32);
        let start = self.lits.alloc_copy(clause);
        self.headers.push(ClauseHeader {
            start,
            size: clause.len() as u32,
            learnt,
            watched: [Lit::UNDEF; 2],
        });
        if learnt {
            self.num_learnts += 1;
        }
        cr
    }

    #[inline]
    pub fn get(&self, cr: CRef) -> ClauseRef {
        let header = self.headers[cr.0 as usize];
        ClauseRef {
            header,
            lits: self.lits.subslice(header.start, header.size),
        }
    }

    #[inline]
    pub fn lits(&self, cr: CRef) -> &[Lit] {
        let h = &self.headers[cr.0 as usize];
        self.lits.subslice(h.start, h.size)
    }

    #[inline]
    pub fn watched(&self, cr: CRef) -> [Lit; 2] {
        self.headers[cr.0 as usize].watched
    }

    #[inline]
    pub fn set_watched(&mut self, cr: CRef, slot: usize, lit: Lit) {
        debug_assert!(slot < 2);
        self.headers[cr.0 as usize].watched[slot] = lit;
    }

    /// Iterate over all clause references, in allocation order.
    pub fn iter_refs(&self) -> impl Iterator<Item = CRef> {
        (0..self.headers.len() as u32).map(CRef)
    }
}

impl Default for ClauseDb {
    fn default() -> Self {
        ClauseDb::new()
    }
}

/// Sort, remove duplicates, and check for tautologies.
///
/// Returns `false` if the clause contains both a literal and its negation,
/// in which case it can be dropped.
pub fn normalize(clause: &mut Vec<Lit>) -> bool {
    clause.sort_unstable();
    clause.dedup();
    !is_tautology(clause)
}

/// `true` if the sorted, duplicate-free `clause` contains some `l` and `¬l`.
///
/// Complementary literals are adjacent in the `Lit` order.
pub fn is_tautology(clause: &[Lit]) -> bool {
    clause.windows(2).any(|w| w[0].var() == w[1].var())
}

/// Resolvent of `a` and `b` on `pivot`.
///
/// The result contains every literal of `a` and `b` except those of
/// `pivot`, without duplicates, sorted.
pub fn resolve(a: &[Lit], b: &[Lit], pivot: Var) -> Vec<Lit> {
    let mut res: Vec<Lit> = a
        .iter()
        .chain(b.iter())
        .copied()
        .filter(|lit| lit.var() != pivot)
        .collect();
    res.sort_unstable();
    res.dedup();
    res
}

/// Predicate that decides whether a value `V` is deleted or not
pub trait DeletePred<V> {
    fn deleted(&self, v: &V) -> bool;
}

pub type OccVec<V> = Vec<V>;

/// List of occurrences of objects of type `K` (e.g. literals) in values
/// of type `V` (e.g. clause indices).
///
/// Deletion is lazy: a key is `smudge`d when some of its values may have
/// been deleted, and cleaned with a `DeletePred` on next lookup.
#[derive(Debug, Clone)]
pub struct OccListsData<K: AsIndex, V> {
    occs: IntMap<K, OccVec<V>>,
    dirty: IntMapBool<K>,
}

impl<K: AsIndex, V> OccListsData<K, V> {
    pub fn new() -> Self {
        Self {
            occs: IntMap::new(),
            dirty: IntMapBool::new(),
        }
    }

    /// Initialize occurrence list for the given `idx`
    pub fn init(&mut self, idx: K) {
        self.occs.reserve_default(idx);
        self.occs[idx].clear();
        self.dirty.reserve(idx);
    }

    /// `oclist.lookup_mut_pred(idx, p)` returns an up-to-date list of occurrences
    /// for `idx`. It will clean up the occurrence list with `p` if it's dirty.
    pub fn lookup_mut_pred<P: DeletePred<V>>(&mut self, idx: K, pred: &P) -> &mut OccVec<V> {
        if self.dirty[idx] {
            self.occs[idx].retain(|x| !pred.deleted(x));
            self.dirty.set(idx, false);
        }
        &mut self.occs[idx]
    }

    /// Mark index `K` as dirty, so it can be cleaned up later
    pub fn smudge(&mut self, idx: K) {
        self.dirty.set(idx, true);
    }
}

impl<K: AsIndex, V> ops::Index<K> for OccListsData<K, V> {
    type Output = OccVec<V>;
    fn index(&self, index: K) -> &Self::Output {
        &self.occs[index]
    }
}
impl<K: AsIndex, V> ops::IndexMut<K> for OccListsData<K, V> {
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.occs[index]
    }
}

/// Anything that can be considered as a list of literals.
pub trait ClauseIterable: fmt::Debug {
    fn items(&self) -> &[Lit];
}

/// Any iterable clause can be printed in DIMACS
impl<T: ClauseIterable> display::Print for T {
    fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result {
        for lit in self.items() {
            write!(out, "{} ", lit.to_dimacs())?;
        }
        write!(out, "0")
    }
}

impl<'a> ClauseIterable for ClauseRef<'a> {
    fn items(&self) -> &[Lit] {
        self.lits
    }
}

impl<'a> ClauseIterable for &'a [Lit] {
    fn items(&self) -> &[Lit] {
        self
    }
}

impl ClauseIterable for Vec<Lit> {
    fn items(&self) -> &[Lit] {
        self
    }
}

/// Generic interface for objects printable in DIMACS
pub mod display {
    use std::fmt;

    /// Objects that can be printed in DIMACS syntax
    pub trait Print: Sized {
        fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result;

        /// Any type implementing `T` can  be used in a format string by
        /// just using `x.pp_dimacs()` instead of `x`.
        ///
        /// ```
        /// use uipsat::*;
        /// let v: Vec<Lit> = vec![Lit::from_dimacs(1).unwrap(), Lit::from_dimacs(-2).unwrap()];
        /// assert_eq!(format!("{}", v.pp_dimacs()), "1 -2 0");
        /// ```
        fn pp_dimacs(&self) -> PrintWrapper<Self> {
            PrintWrapper(&self)
        }
    }

    /// A wrapper that can be used to display objects in format strings
    pub struct PrintWrapper<'a, T: 'a + Print>(&'a T);

    // Whenever `T` is printable in DIMACS, its wrapper implements Display
    impl<'a, T: Print> fmt::Display for PrintWrapper<'a, T> {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            self.0.fmt_dimacs(out)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lits(xs: &[i32]) -> Vec<Lit> {
        xs.iter().map(|&i| Lit::from_dimacs(i).unwrap()).collect()
    }

    #[test]
    fn test_eq() {
        for i in 0..4 {
            let a = lbool::from_u8(i);
            for j in 0..4 {
                let b = lbool::from_u8(j);
                let are_eq = (i == 0 && j == 0) || (i == 1 && j == 1) || (i >= 2 && j >= 2);
                assert_eq!(are_eq, a == b, "{:?}[{}] == {:?}[{}]", a, i, b, j);
            }
        }
    }

    #[test]
    fn test_not() {
        assert_eq!(-lbool::TRUE, lbool::FALSE);
        assert_eq!(-lbool::FALSE, lbool::TRUE);
        assert_eq!(-lbool::UNDEF, lbool::UNDEF);
    }

    #[test]
    fn test_bitxor() {
        assert_eq!(lbool::TRUE ^ true, lbool::FALSE);
        assert_eq!(lbool::TRUE ^ false, lbool::TRUE);
        assert_eq!(lbool::FALSE ^ true, lbool::TRUE);
        assert_eq!(lbool::UNDEF ^ true, lbool::UNDEF);
    }

    #[test]
    fn test_dimacs_lits() {
        let l = Lit::from_dimacs(5).unwrap();
        assert!(l.sign());
        assert_eq!(l.var().idx(), 4);
        assert_eq!((!l).to_dimacs(), -5);
        assert_eq!(format!("{:?}", !l), "-5");
    }

    #[test]
    fn test_resolve() {
        // (a ∨ b) and (¬a ∨ c) on a
        let r = resolve(&lits(&[1, 2]), &lits(&[-1, 3]), Var::from_idx(0));
        assert_eq!(r, lits(&[2, 3]));

        // shared literals appear once
        let r = resolve(&lits(&[1, 2, -4]), &lits(&[-1, 2, 3, -4]), Var::from_idx(0));
        assert_eq!(r, lits(&[2, 3, -4]));
        assert!(!is_tautology(&r));

        // resolving on one of two clashing variables gives a tautology
        let r = resolve(&lits(&[1, 2]), &lits(&[-1, -2]), Var::from_idx(0));
        assert!(is_tautology(&r));
    }

    #[test]
    fn test_normalize() {
        let mut c = lits(&[3, -1, 3, 2]);
        assert!(normalize(&mut c));
        assert_eq!(c, lits(&[-1, 2, 3]));
        let mut c = lits(&[2, -1, -2]);
        assert!(!normalize(&mut c));
    }

    #[test]
    fn test_clause_db() {
        let mut db = ClauseDb::new();
        let c0 = db.alloc(&lits(&[1, -2, 3]), false);
        let c1 = db.alloc(&lits(&[4]), true);
        assert_eq!(db.len(), 2);
        assert_eq!(db.num_learnts(), 1);
        assert_eq!(db.num_lits(), 4);
        assert_eq!(db.lits(c0), &lits(&[1, -2, 3])[..]);
        assert!(db.get(c1).learnt());
        assert_eq!(db.watched(c0), [Lit::UNDEF; 2]);
        db.set_watched(c0, 1, Lit::from_dimacs(3).unwrap());
        assert_eq!(db.get(c0).watched()[1], Lit::from_dimacs(3).unwrap());
        assert_eq!(db.iter_refs().collect::<Vec<_>>(), vec![c0, c1]);
    }

    #[test]
    fn test_occ_lists_lazy_clean() {
        struct Odd;
        impl DeletePred<usize> for Odd {
            fn deleted(&self, v: &usize) -> bool {
                v % 2 == 1
            }
        }
        let l = Lit::from_dimacs(2).unwrap();
        let mut occs: OccListsData<Lit, usize> = OccListsData::new();
        occs.init(l);
        occs[l].extend(&[0, 1, 2, 3]);
        assert_eq!(occs.lookup_mut_pred(l, &Odd).len(), 4);
        occs.smudge(l);
        assert_eq!(occs.lookup_mut_pred(l, &Odd), &mut vec![0, 2]);
    }
}
