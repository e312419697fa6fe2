/*****************************************************************************************[alloc.rs]
Copyright (c) 2008-2010, Niklas Sorensson (MiniSat)
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

use std::fmt;
use std::marker::PhantomData;
use std::ops;

/// Append-only arena of `T` values.
///
/// Regions are never freed individually: the whole arena lives as long as
/// its owner (a clause database only ever grows during search).
#[derive(Debug, Clone)]
pub struct RegionAllocator<T: Copy> {
    vec: Vec<T>,
}

impl<T: Copy> RegionAllocator<T> {
    pub fn new(start_cap: u32) -> Self {
        Self {
            vec: Vec::with_capacity(start_cap as usize),
        }
    }

    /// Total number of slots in use.
    #[inline]
    pub fn len(&self) -> u32 {
        self.vec.len() as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Copy `items` at the end of the arena, returning a reference to the
    /// first copied slot.
    pub fn alloc_copy(&mut self, items: &[T]) -> Ref<T> {
        debug_assert!(self.vec.len() + items.len() < u32::MAX as usize);
        let r = Ref(self.vec.len() as u32, PhantomData);
        self.vec.extend_from_slice(items);
        r
    }

    pub fn subslice(&self, r: Ref<T>, len: u32) -> &[T] {
        &self.vec[r.0 as usize..r.0 as usize + len as usize]
    }

    pub fn subslice_mut(&mut self, r: Ref<T>, len: u32) -> &mut [T] {
        &mut self.vec[r.0 as usize..r.0 as usize + len as usize]
    }
}

impl<T: Copy> ops::Index<Ref<T>> for RegionAllocator<T> {
    type Output = T;
    fn index(&self, index: Ref<T>) -> &Self::Output {
        &self.vec[index.0 as usize]
    }
}
impl<T: Copy> ops::IndexMut<Ref<T>> for RegionAllocator<T> {
    fn index_mut(&mut self, index: Ref<T>) -> &mut Self::Output {
        &mut self.vec[index.0 as usize]
    }
}

/// A reference to a `T` value living in the allocator.
///
/// The reference is invariant in `T`.
pub struct Ref<T: Copy>(u32, PhantomData<fn(T) -> T>);

// derives would put bounds on `T`
impl<T: Copy> Clone for Ref<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: Copy> Copy for Ref<T> {}

impl<T: Copy> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Ref").field(&self.0).finish()
    }
}
impl<T: Copy> PartialEq for Ref<T> {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0
    }
}
impl<T: Copy> Eq for Ref<T> {}

impl<T: Copy> Ref<T> {
    pub const UNDEF: Self = Ref(!0, PhantomData);

    /// Offset of the referenced slot inside its arena.
    #[inline(always)]
    pub fn offset(&self) -> u32 {
        self.0
    }
}

impl<T: Copy> ops::Add<u32> for Ref<T> {
    type Output = Ref<T>;
    fn add(self, rhs: u32) -> Self::Output {
        Ref(self.0 + rhs, PhantomData)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_regions_are_contiguous() {
        let mut ra: RegionAllocator<u32> = RegionAllocator::new(4);
        let a = ra.alloc_copy(&[1, 2, 3]);
        let b = ra.alloc_copy(&[4, 5]);
        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 3);
        assert_eq!(ra.len(), 5);
        assert_eq!(ra.subslice(a, 3), &[1, 2, 3]);
        assert_eq!(ra.subslice(b, 2), &[4, 5]);
        assert_eq!(ra[a + 1], 2);
    }

    #[test]
    fn test_subslice_mut() {
        let mut ra: RegionAllocator<u32> = RegionAllocator::new(0);
        let a = ra.alloc_copy(&[7, 8]);
        ra.subslice_mut(a, 2).swap(0, 1);
        assert_eq!(ra.subslice(a, 2), &[8, 7]);
        ra[a] = 9;
        assert_eq!(ra.subslice(a, 2), &[9, 7]);
    }
}
