/*****************************************************************************************[intmap.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2011, Niklas Sorensson (MiniSat)
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

//! Dense maps and sets keyed by small integers (variables, literals),
//! and the indexed binary heap used to order variables.

use bit_vec::BitVec;
use std::cmp;
use std::iter;
use std::marker::PhantomData;
use std::ops;

/// Keys that map to a dense `usize` index.
pub trait AsIndex: Copy {
    fn as_index(self) -> usize;
    fn from_index(index: usize) -> Self;
}

#[derive(Debug, Clone)]
pub struct IntMap<K: AsIndex, V> {
    map: Vec<V>,
    _marker: PhantomData<fn(K)>, // contravariance
}

impl<K: AsIndex, V> Default for IntMap<K, V> {
    fn default() -> Self {
        Self {
            map: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<K: AsIndex, V> IntMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn has(&self, k: K) -> bool {
        k.as_index() < self.map.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Make sure `key` is a valid index, padding with `pad`.
    pub fn reserve(&mut self, key: K, pad: V)
    where
        V: Clone,
    {
        let index = key.as_index();
        if index >= self.map.len() {
            self.map.resize(index + 1, pad);
        }
    }

    pub fn reserve_default(&mut self, key: K)
    where
        V: Default,
    {
        let index = key.as_index();
        if index >= self.map.len() {
            self.map.resize_with(index + 1, V::default);
        }
    }

    pub fn insert(&mut self, key: K, val: V, pad: V)
    where
        V: Clone,
    {
        self.reserve(key, pad);
        self[key] = val;
    }

    /// Clear content, keep internal buffers.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn iter(&self) -> impl iter::Iterator<Item = (K, &V)> {
        self.map
            .iter()
            .enumerate()
            .map(|(k, v)| (K::from_index(k), v))
    }

    pub fn iter_mut(&mut self) -> impl iter::Iterator<Item = (K, &mut V)> {
        self.map
            .iter_mut()
            .enumerate()
            .map(|(k, v)| (K::from_index(k), v))
    }
}

impl<K: AsIndex, V> ops::Index<K> for IntMap<K, V> {
    type Output = V;
    #[inline]
    fn index(&self, index: K) -> &Self::Output {
        &self.map[index.as_index()]
    }
}
impl<K: AsIndex, V> ops::IndexMut<K> for IntMap<K, V> {
    #[inline]
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.map[index.as_index()]
    }
}

impl<K: AsIndex, V: PartialEq> PartialEq for IntMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

/// A map from keys to booleans, packed as bits.
#[derive(Debug, Clone)]
pub struct IntMapBool<K: AsIndex> {
    map: BitVec,
    _marker: PhantomData<fn(K)>, // contravariance
}

impl<K: AsIndex> Default for IntMapBool<K> {
    fn default() -> Self {
        IntMapBool::new()
    }
}

impl<K: AsIndex> ops::Index<K> for IntMapBool<K> {
    type Output = bool;
    #[inline]
    fn index(&self, index: K) -> &Self::Output {
        &self.map[index.as_index()]
    }
}

impl<K: AsIndex> IntMapBool<K> {
    pub fn new() -> Self {
        Self {
            map: BitVec::new(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn has(&self, k: K) -> bool {
        k.as_index() < self.map.len()
    }

    #[inline]
    pub fn set(&mut self, k: K, b: bool) {
        self.map.set(k.as_index(), b);
    }

    pub fn reserve(&mut self, key: K) {
        let index = key.as_index();
        let len = self.map.len();
        if index >= len {
            self.map.grow(index - len + 1, false);
        }
    }

    pub fn clear(&mut self) {
        self.map.truncate(0);
    }

    /// Set `key` to true, growing the map if needed.
    #[inline]
    pub fn insert(&mut self, key: K) {
        self.reserve(key);
        self.map.set(key.as_index(), true);
    }

    /// `true` iff `key` is present and set.
    #[inline]
    pub fn get(&self, key: K) -> bool {
        self.has(key) && self.map[key.as_index()]
    }
}

/// A set of keys that remembers insertion order, with O(1) membership.
///
/// Used as a duplicate-free worklist.
#[derive(Debug, Clone)]
pub struct IntSet<K: AsIndex> {
    in_set: IntMapBool<K>,
    xs: Vec<K>,
}

impl<K: AsIndex> Default for IntSet<K> {
    fn default() -> Self {
        Self {
            in_set: IntMapBool::default(),
            xs: vec![],
        }
    }
}

impl<K: AsIndex> IntSet<K> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.xs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
    pub fn clear(&mut self) {
        for &k in &self.xs {
            self.in_set.set(k, false);
        }
        self.xs.clear()
    }
    pub fn as_slice(&self) -> &[K] {
        &self.xs
    }
    pub fn insert(&mut self, k: K) {
        if !self.in_set.get(k) {
            self.in_set.insert(k);
            self.xs.push(k);
        }
    }
    pub fn has(&self, k: K) -> bool {
        self.in_set.get(k)
    }
    /// Remove and return the most recently inserted key.
    pub fn pop(&mut self) -> Option<K> {
        let k = self.xs.pop()?;
        self.in_set.set(k, false);
        Some(k)
    }
}

impl<K: AsIndex> ops::Deref for IntSet<K> {
    type Target = [K];
    fn deref(&self) -> &Self::Target {
        &self.xs
    }
}

/// Storage for a binary heap of keys. Use `promote` with a comparator to
/// operate on it.
#[derive(Debug, Clone)]
pub struct HeapData<K: AsIndex> {
    heap: Vec<K>,
    indices: IntMap<K, i32>,
}

impl<K: AsIndex> Default for HeapData<K> {
    fn default() -> Self {
        Self {
            heap: Vec::new(),
            indices: IntMap::new(),
        }
    }
}

impl<K: AsIndex> HeapData<K> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    pub fn in_heap(&self, k: K) -> bool {
        self.indices.has(k) && self.indices[k] >= 0
    }

    pub fn promote<Comp: Comparator<K>>(&mut self, comp: Comp) -> Heap<K, Comp> {
        Heap { data: self, comp }
    }
}

pub trait Comparator<T: ?Sized> {
    fn cmp(&self, lhs: &T, rhs: &T) -> cmp::Ordering;

    #[inline]
    fn lt(&self, lhs: &T, rhs: &T) -> bool {
        self.cmp(lhs, rhs) == cmp::Ordering::Less
    }
}

/// A min-heap on top of some `HeapData`, for the order given by `Comp`.
#[derive(Debug)]
pub struct Heap<'a, K: AsIndex + 'a, Comp: Comparator<K>> {
    data: &'a mut HeapData<K>,
    comp: Comp,
}

impl<'a, K: AsIndex + 'a, Comp: Comparator<K>> ops::Deref for Heap<'a, K, Comp> {
    type Target = HeapData<K>;
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<'a, K: AsIndex + 'a, Comp: Comparator<K>> Heap<'a, K, Comp> {
    fn percolate_up(&mut self, mut i: usize) {
        let heap = &mut self.data.heap;
        let indices = &mut self.data.indices;
        let x = heap[i];
        while i != 0 {
            let p = parent_index(i);
            if !self.comp.lt(&x, &heap[p]) {
                break;
            }
            heap[i] = heap[p];
            indices[heap[i]] = i as i32;
            i = p;
        }
        heap[i] = x;
        indices[x] = i as i32;
    }

    fn percolate_down(&mut self, mut i: usize) {
        let heap = &mut self.data.heap;
        let indices = &mut self.data.indices;
        let x = heap[i];
        while left_index(i) < heap.len() {
            let (l, r) = (left_index(i), right_index(i));
            let child = if r < heap.len() && self.comp.lt(&heap[r], &heap[l]) {
                r
            } else {
                l
            };
            if !self.comp.lt(&heap[child], &x) {
                break;
            }
            heap[i] = heap[child];
            indices[heap[i]] = i as i32;
            i = child;
        }
        heap[i] = x;
        indices[x] = i as i32;
    }

    /// `k` became smaller for the comparator: move it up.
    pub fn decrease(&mut self, k: K) {
        debug_assert!(self.in_heap(k));
        let k_index = self.data.indices[k] as usize;
        self.percolate_up(k_index);
    }

    pub fn insert(&mut self, k: K) {
        self.data.indices.reserve(k, -1);
        debug_assert!(!self.in_heap(k));

        let k_index = self.data.heap.len();
        self.data.indices[k] = k_index as i32;
        self.data.heap.push(k);
        self.percolate_up(k_index);
    }

    /// Remove and return the smallest key, if any.
    pub fn pop_min(&mut self) -> Option<K> {
        let x = *self.data.heap.first()?;
        let last = self.data.heap.pop()?;
        self.data.indices[x] = -1;
        if !self.data.heap.is_empty() {
            self.data.heap[0] = last;
            self.data.indices[last] = 0;
            self.percolate_down(0);
        }
        Some(x)
    }

    /// Rebuild the heap from scratch, using the elements in `ns`.
    pub fn build(&mut self, ns: &[K]) {
        self.clear();
        for (i, &x) in ns.iter().enumerate() {
            self.data.indices.reserve(x, -1);
            self.data.indices[x] = i as i32;
            self.data.heap.push(x);
        }
        for i in (0..self.data.heap.len() / 2).rev() {
            self.percolate_down(i);
        }
    }

    pub fn clear(&mut self) {
        let data = &mut self.data;
        for &x in &data.heap {
            data.indices[x] = -1;
        }
        data.heap.clear();
    }
}

#[inline(always)]
fn left_index(i: usize) -> usize {
    i * 2 + 1
}
#[inline(always)]
fn right_index(i: usize) -> usize {
    (i + 1) * 2
}
#[inline(always)]
fn parent_index(i: usize) -> usize {
    (i - 1) >> 1
}

#[cfg(test)]
mod test {
    use super::*;

    impl AsIndex for u32 {
        fn as_index(self) -> usize {
            self as usize
        }
        fn from_index(index: usize) -> Self {
            index as u32
        }
    }

    /// order by `weight` descending, then by key ascending
    struct ByWeight<'a>(&'a [u32]);

    impl<'a> Comparator<u32> for ByWeight<'a> {
        fn cmp(&self, lhs: &u32, rhs: &u32) -> cmp::Ordering {
            let (wl, wr) = (self.0[*lhs as usize], self.0[*rhs as usize]);
            wr.cmp(&wl).then(lhs.cmp(rhs))
        }
    }

    #[test]
    fn test_heap_order() {
        let weights = [3, 7, 7, 0, 5, 7];
        let mut data = HeapData::new();
        let mut heap = data.promote(ByWeight(&weights));
        for k in (0..6).rev() {
            heap.insert(k);
        }
        let mut out = vec![];
        while let Some(k) = heap.pop_min() {
            out.push(k);
        }
        assert_eq!(out, vec![1, 2, 5, 4, 0, 3]);
        assert!(heap.is_empty());
        assert!(!heap.in_heap(1));
    }

    #[test]
    fn test_heap_decrease_and_build() {
        let mut weights = vec![1, 2, 3, 4];
        let mut data = HeapData::new();
        data.promote(ByWeight(&weights)).build(&[0, 1, 2, 3]);
        weights[0] = 10;
        {
            let mut heap = data.promote(ByWeight(&weights));
            heap.decrease(0);
            assert_eq!(heap.pop_min(), Some(0));
            assert_eq!(heap.pop_min(), Some(3));
        }
        assert_eq!(data.len(), 2);
        assert!(data.in_heap(1) && data.in_heap(2));
    }

    #[test]
    fn test_intset_worklist() {
        let mut s: IntSet<u32> = IntSet::new();
        s.insert(4);
        s.insert(1);
        s.insert(4);
        assert_eq!(s.len(), 2);
        assert!(s.has(4) && !s.has(3) && !s.has(100));
        assert_eq!(s.pop(), Some(1));
        assert!(!s.has(1));
        s.insert(1);
        assert_eq!(s.as_slice(), &[4, 1]);
        s.clear();
        assert!(s.is_empty() && !s.has(4));
    }
}
