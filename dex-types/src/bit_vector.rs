//! Dense, word-packed bit vectors.
//!
//! Two flavors are provided: borrowed views over caller-provided storage
//! (`BitVectorView`/`BitVectorViewMut`), generic over the word type, and a
//! growable owning `BitVector` over `u32` words. Single-bit operations do not
//! care about trailing bits in the last storage word; multi-bit operations
//! other than the two initializers (`clear_all` and `set_initial_bits`)
//! require the trailing bits to be clear on entry.

use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Shl, Sub};

mod private {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for usize {}
}

/// Storage word for a bit-vector view.
pub trait BitWord:
    Copy
    + Eq
    + private::Sealed
    + BitOr<Output = Self>
    + BitOrAssign
    + BitAnd<Output = Self>
    + BitAndAssign
    + Not<Output = Self>
    + Shl<usize, Output = Self>
    + Sub<Output = Self>
    + fmt::Debug
{
    /// Number of bits in the word.
    const BITS: usize;
    /// The all-zeros word.
    const ZERO: Self;
    /// The word with only the lowest bit set.
    const ONE: Self;
    /// The all-ones word.
    const MAX: Self;

    /// Number of trailing zero bits.
    fn trailing_zeros(self) -> u32;
    /// Number of set bits.
    fn count_ones(self) -> u32;
}

macro_rules! impl_bit_word {
    ($($t:ty),*) => {$(
        impl BitWord for $t {
            const BITS: usize = <$t>::BITS as usize;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MAX: Self = <$t>::MAX;

            fn trailing_zeros(self) -> u32 {
                <$t>::trailing_zeros(self)
            }

            fn count_ones(self) -> u32 {
                <$t>::count_ones(self)
            }
        }
    )*};
}

impl_bit_word!(u32, u64, usize);

fn words_for_bits<W: BitWord>(bits: usize) -> usize {
    bits.div_ceil(W::BITS)
}

fn word_index<W: BitWord>(index: usize) -> usize {
    index / W::BITS
}

fn bit_mask<W: BitWord>(index: usize) -> W {
    W::ONE << (index % W::BITS)
}

/// A shared view over externally-provided bit storage.
pub struct BitVectorView<'a, W = usize> {
    words: &'a [W],
    bits: usize,
}

impl<'a, W> Clone for BitVectorView<'a, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, W> Copy for BitVectorView<'a, W> {}

impl<'a, W: BitWord> BitVectorView<'a, W> {
    /// Wrap `words` as a view of `size_in_bits` bits.
    pub fn new(words: &'a [W], size_in_bits: usize) -> Self {
        debug_assert!(size_in_bits <= words.len() * W::BITS);
        Self {
            words,
            bits: size_in_bits,
        }
    }

    /// Size of the view in bits.
    pub fn size_in_bits(&self) -> usize {
        self.bits
    }

    /// Size of the view in storage words.
    pub fn size_in_words(&self) -> usize {
        words_for_bits::<W>(self.bits)
    }

    /// Whether the bit at `index` is set.
    pub fn is_set(&self, index: usize) -> bool {
        debug_assert!(index < self.bits);
        self.words[word_index::<W>(index)] & bit_mask::<W>(index) != W::ZERO
    }

    /// Whether any bit is set.
    pub fn is_any_set(&self) -> bool {
        self.debug_check_trailing_clear();
        self.words[..self.size_in_words()].iter().any(|&w| w != W::ZERO)
    }

    /// Iterate over indexes of set bits in ascending order.
    pub fn indexes(&self) -> Indexes<'a, W> {
        Indexes::new(self.words, self.bits)
    }

    fn debug_check_trailing_clear(&self) {
        if self.bits % W::BITS != 0 {
            let last = self.words[word_index::<W>(self.bits)];
            debug_assert_eq!(last & !(bit_mask::<W>(self.bits) - W::ONE), W::ZERO);
        }
    }
}

/// A mutable view over externally-provided bit storage.
pub struct BitVectorViewMut<'a, W = usize> {
    words: &'a mut [W],
    bits: usize,
}

impl<'a, W: BitWord> BitVectorViewMut<'a, W> {
    /// Wrap `words` as a mutable view of `size_in_bits` bits.
    pub fn new(words: &'a mut [W], size_in_bits: usize) -> Self {
        debug_assert!(size_in_bits <= words.len() * W::BITS);
        Self {
            words,
            bits: size_in_bits,
        }
    }

    /// Reborrow as a shared view.
    pub fn as_view(&self) -> BitVectorView<'_, W> {
        BitVectorView::new(self.words, self.bits)
    }

    /// Size of the view in bits.
    pub fn size_in_bits(&self) -> usize {
        self.bits
    }

    /// Mark the bit at `index` as set.
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.bits);
        self.words[word_index::<W>(index)] |= bit_mask::<W>(index);
    }

    /// Mark the bit at `index` as clear.
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.bits);
        self.words[word_index::<W>(index)] &= !bit_mask::<W>(index);
    }

    /// Whether the bit at `index` is set.
    pub fn is_set(&self, index: usize) -> bool {
        self.as_view().is_set(index)
    }

    /// Mark all bits as clear, including any trailing bits.
    pub fn clear_all(&mut self) {
        let words = words_for_bits::<W>(self.bits);
        self.words[..words].fill(W::ZERO);
    }

    /// Set bits `0..num_bits` and clear all bits after that, trailing bits
    /// included.
    pub fn set_initial_bits(&mut self, num_bits: usize) {
        debug_assert!(num_bits <= self.bits);
        let complete = num_bits / W::BITS;
        self.words[..complete].fill(W::MAX);
        let total = words_for_bits::<W>(self.bits);
        self.words[complete..total].fill(W::ZERO);
        if num_bits % W::BITS != 0 {
            self.words[complete] = bit_mask::<W>(num_bits) - W::ONE;
        }
    }

    /// Whether any bit is set.
    pub fn is_any_set(&self) -> bool {
        self.as_view().is_any_set()
    }

    /// Union with another view of the same size. Returns whether any bit
    /// that was clear became set.
    pub fn union(&mut self, union_with: BitVectorView<'_, W>) -> bool {
        debug_assert_eq!(self.bits, union_with.bits);
        self.as_view().debug_check_trailing_clear();
        union_with.debug_check_trailing_clear();
        let words = words_for_bits::<W>(self.bits);
        let mut changed = false;
        for i in 0..words {
            let added = union_with.words[i] & !self.words[i];
            changed |= added != W::ZERO;
            self.words[i] |= added;
        }
        changed
    }

    /// Union with the bits in `union_with` that are not in `not_in`. All
    /// views must have the same size. Returns whether any bit that was clear
    /// became set.
    pub fn union_if_not_in(
        &mut self,
        union_with: BitVectorView<'_, W>,
        not_in: BitVectorView<'_, W>,
    ) -> bool {
        debug_assert_eq!(self.bits, union_with.bits);
        debug_assert_eq!(self.bits, not_in.bits);
        self.as_view().debug_check_trailing_clear();
        union_with.debug_check_trailing_clear();
        not_in.debug_check_trailing_clear();
        let words = words_for_bits::<W>(self.bits);
        let mut changed = false;
        for i in 0..words {
            let added = union_with.words[i] & !not_in.words[i] & !self.words[i];
            changed |= added != W::ZERO;
            self.words[i] |= added;
        }
        changed
    }

    /// Iterate over indexes of set bits in ascending order.
    pub fn indexes(&self) -> Indexes<'_, W> {
        Indexes::new(self.words, self.bits)
    }
}

/// Forward iterator over the indexes of set bits, lowest to highest.
pub struct Indexes<'a, W> {
    words: &'a [W],
    bits: usize,
    word_index: usize,
    current: W,
}

impl<'a, W: BitWord> Indexes<'a, W> {
    fn new(words: &'a [W], bits: usize) -> Self {
        let current = if words_for_bits::<W>(bits) == 0 {
            W::ZERO
        } else {
            words[0]
        };
        Self {
            words,
            bits,
            word_index: 0,
            current,
        }
    }
}

impl<'a, W: BitWord> Iterator for Indexes<'a, W> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let total_words = words_for_bits::<W>(self.bits);
        while self.current == W::ZERO {
            self.word_index += 1;
            if self.word_index >= total_words {
                return None;
            }
            self.current = self.words[self.word_index];
        }
        let bit = self.current.trailing_zeros() as usize;
        // Clear the lowest set bit.
        self.current = self.current & (self.current - W::ONE);
        let index = self.word_index * W::BITS + bit;
        debug_assert!(index < self.bits);
        Some(index)
    }
}

/// Expanding bit vector over `u32` words.
///
/// Out-of-range writes grow the storage when the vector is expandable;
/// out-of-range reads return `false`, and out-of-range clears are a no-op.
pub struct BitVector {
    storage: Vec<u32>,
    expandable: bool,
}

impl BitVector {
    const WORD_BITS: usize = u32::BITS as usize;

    /// Create a vector able to hold at least `start_bits` bits.
    pub fn new(start_bits: usize, expandable: bool) -> Self {
        Self {
            storage: vec![0u32; words_for_bits::<u32>(start_bits)],
            expandable,
        }
    }

    /// Current capacity in bits.
    pub fn size_in_bits(&self) -> usize {
        self.storage.len() * Self::WORD_BITS
    }

    /// Whether out-of-range writes grow the storage.
    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    /// Mark the bit at `index` as set, growing the storage if needed.
    pub fn set_bit(&mut self, index: usize) {
        let word = word_index::<u32>(index);
        if word >= self.storage.len() {
            assert!(
                self.expandable,
                "attempt to expand a non-expandable bit vector to bit {index}"
            );
            self.storage.resize(word + 1, 0);
        }
        self.storage[word] |= bit_mask::<u32>(index);
    }

    /// Mark the bit at `index` as clear. A no-op when out of range.
    pub fn clear_bit(&mut self, index: usize) {
        let word = word_index::<u32>(index);
        if word < self.storage.len() {
            self.storage[word] &= !bit_mask::<u32>(index);
        }
    }

    /// Whether the bit at `index` is set. `false` when out of range.
    pub fn is_bit_set(&self, index: usize) -> bool {
        let word = word_index::<u32>(index);
        word < self.storage.len() && self.storage[word] & bit_mask::<u32>(index) != 0
    }

    /// Mark all bits as clear.
    pub fn clear_all_bits(&mut self) {
        self.storage.fill(0);
    }

    /// Union with another vector, growing if it carries higher set bits.
    /// Returns whether any bit that was clear became set.
    pub fn union(&mut self, other: &BitVector) -> bool {
        if other.storage.len() > self.storage.len()
            && other.storage[self.storage.len()..].iter().any(|&w| w != 0)
        {
            assert!(self.expandable, "union would expand a non-expandable bit vector");
            self.storage.resize(other.storage.len(), 0);
        }
        let mut changed = false;
        let common = self.storage.len().min(other.storage.len());
        for i in 0..common {
            let added = other.storage[i] & !self.storage[i];
            changed |= added != 0;
            self.storage[i] |= added;
        }
        changed
    }

    /// Replace the contents with a copy of `other`.
    pub fn copy_from(&mut self, other: &BitVector) {
        self.storage.clear();
        self.storage.extend_from_slice(&other.storage);
    }

    /// Whether both vectors have exactly the same bits set, regardless of
    /// their capacities.
    pub fn same_bits_set(&self, other: &BitVector) -> bool {
        let common = self.storage.len().min(other.storage.len());
        self.storage[..common] == other.storage[..common]
            && self.storage[common..].iter().all(|&w| w == 0)
            && other.storage[common..].iter().all(|&w| w == 0)
    }

    /// Index of the highest set bit, if any.
    pub fn highest_bit_set(&self) -> Option<usize> {
        for (i, &word) in self.storage.iter().enumerate().rev() {
            if word != 0 {
                let bit = Self::WORD_BITS - 1 - word.leading_zeros() as usize;
                return Some(i * Self::WORD_BITS + bit);
            }
        }
        None
    }

    /// Number of set bits.
    pub fn num_set_bits(&self) -> usize {
        self.storage.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over indexes of set bits in ascending order.
    pub fn indexes(&self) -> Indexes<'_, u32> {
        Indexes::new(&self.storage, self.size_in_bits())
    }

    /// A non-expandable copy with identical contents.
    pub fn fixed_copy(&self) -> BitVector {
        BitVector {
            storage: self.storage.clone(),
            expandable: false,
        }
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.indexes()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    macro_rules! view_tests {
        ($mod_name:ident, $w:ty) => {
            mod $mod_name {
                use crate::bit_vector::*;

                #[test]
                fn set_clear_is_set() {
                    let mut storage = [<$w>::ZERO; 3];
                    let bits = 2 * <$w as BitWord>::BITS + 5;
                    let mut bv = BitVectorViewMut::<$w>::new(&mut storage, bits);
                    assert!(!bv.is_any_set());
                    bv.set(0);
                    bv.set(<$w as BitWord>::BITS - 1);
                    bv.set(bits - 1);
                    assert!(bv.is_set(0));
                    assert!(bv.is_set(<$w as BitWord>::BITS - 1));
                    assert!(bv.is_set(bits - 1));
                    assert!(!bv.is_set(1));
                    assert!(bv.is_any_set());
                    bv.clear(0);
                    assert!(!bv.is_set(0));
                }

                #[test]
                fn set_initial_bits_boundaries() {
                    let mut storage = [<$w>::MAX; 3];
                    let bits = 2 * <$w as BitWord>::BITS + 5;
                    let mut bv = BitVectorViewMut::<$w>::new(&mut storage, bits);
                    for n in [0, 1, <$w as BitWord>::BITS, bits - 1, bits] {
                        bv.set_initial_bits(n);
                        for i in 0..bits {
                            assert_eq!(bv.is_set(i), i < n, "n={n} i={i}");
                        }
                    }
                }

                #[test]
                fn indexes_ascending() {
                    let mut storage = [<$w>::ZERO; 3];
                    let bits = 2 * <$w as BitWord>::BITS + 5;
                    let mut bv = BitVectorViewMut::<$w>::new(&mut storage, bits);
                    let expected = [0usize, 3, <$w as BitWord>::BITS, bits - 1];
                    for &i in &expected {
                        bv.set(i);
                    }
                    let collected: Vec<usize> = bv.indexes().collect();
                    assert_eq!(collected, expected);
                }

                #[test]
                fn union_reports_change() {
                    let mut a_storage = [<$w>::ZERO; 2];
                    let mut b_storage = [<$w>::ZERO; 2];
                    let bits = <$w as BitWord>::BITS + 3;
                    let mut a = BitVectorViewMut::<$w>::new(&mut a_storage, bits);
                    let mut b = BitVectorViewMut::<$w>::new(&mut b_storage, bits);
                    a.set(1);
                    b.set(1);
                    assert!(!a.union(b.as_view()));
                    b.set(bits - 1);
                    assert!(a.union(b.as_view()));
                    assert!(a.is_set(bits - 1));
                }

                #[test]
                fn union_if_not_in_masks_bits() {
                    let mut a_storage = [<$w>::ZERO; 2];
                    let mut u_storage = [<$w>::ZERO; 2];
                    let mut n_storage = [<$w>::ZERO; 2];
                    let bits = <$w as BitWord>::BITS + 3;
                    let mut a = BitVectorViewMut::<$w>::new(&mut a_storage, bits);
                    let mut u = BitVectorViewMut::<$w>::new(&mut u_storage, bits);
                    let mut n = BitVectorViewMut::<$w>::new(&mut n_storage, bits);
                    u.set(2);
                    u.set(5);
                    n.set(5);
                    assert!(a.union_if_not_in(u.as_view(), n.as_view()));
                    assert!(a.is_set(2));
                    assert!(!a.is_set(5));
                    // A second application adds nothing.
                    assert!(!a.union_if_not_in(u.as_view(), n.as_view()));
                }
            }
        };
    }

    view_tests!(view_u32, u32);
    view_tests!(view_u64, u64);
    view_tests!(view_usize, usize);

    quickcheck! {
        fn qc_union_is_bitwise_or(a: Vec<bool>, b: Vec<bool>) -> bool {
            let bits = a.len().min(b.len());
            let words = bits.div_ceil(32).max(1);
            let mut a_storage = vec![0u32; words];
            let mut b_storage = vec![0u32; words];
            let mut av = BitVectorViewMut::<u32>::new(&mut a_storage, bits);
            let mut bv = BitVectorViewMut::<u32>::new(&mut b_storage, bits);
            for i in 0..bits {
                if a[i] {
                    av.set(i);
                }
                if b[i] {
                    bv.set(i);
                }
            }
            av.union(bv.as_view());
            (0..bits).all(|i| av.is_set(i) == (a[i] || b[i]))
        }

        fn qc_union_if_not_in_law(u: Vec<bool>, n: Vec<bool>) -> bool {
            let bits = u.len().min(n.len());
            let words = bits.div_ceil(32).max(1);
            let mut a_storage = vec![0u32; words];
            let mut u_storage = vec![0u32; words];
            let mut n_storage = vec![0u32; words];
            let mut av = BitVectorViewMut::<u32>::new(&mut a_storage, bits);
            let mut uv = BitVectorViewMut::<u32>::new(&mut u_storage, bits);
            let mut nv = BitVectorViewMut::<u32>::new(&mut n_storage, bits);
            for i in 0..bits {
                if u[i] {
                    uv.set(i);
                }
                if n[i] {
                    nv.set(i);
                }
            }
            let expect_change = (0..bits).any(|i| u[i] && !n[i]);
            let changed = av.union_if_not_in(uv.as_view(), nv.as_view());
            changed == expect_change
                && (0..bits).all(|i| av.is_set(i) == (u[i] && !n[i]))
        }
    }

    #[test]
    fn expandable_vector_grows() {
        let mut bv = BitVector::new(8, true);
        bv.set_bit(0);
        bv.set_bit(100);
        assert!(bv.is_bit_set(0));
        assert!(bv.is_bit_set(100));
        assert!(!bv.is_bit_set(99));
        // Out-of-range reads and clears are benign.
        assert!(!bv.is_bit_set(100_000));
        bv.clear_bit(100_000);
    }

    #[test]
    #[should_panic(expected = "non-expandable")]
    fn non_expandable_vector_panics_on_growth() {
        let mut bv = BitVector::new(8, false);
        bv.set_bit(64);
    }

    #[test]
    fn owning_union_and_same_bits() {
        let mut a = BitVector::new(8, true);
        let mut b = BitVector::new(256, true);
        b.set_bit(3);
        b.set_bit(200);
        assert!(a.union(&b));
        assert!(a.is_bit_set(3));
        assert!(a.is_bit_set(200));
        assert!(a.same_bits_set(&b));
        assert!(!a.union(&b));
        a.set_bit(4);
        assert!(!a.same_bits_set(&b));
    }

    #[test]
    fn highest_bit_and_popcount() {
        let mut bv = BitVector::new(64, true);
        assert_eq!(bv.highest_bit_set(), None);
        bv.set_bit(5);
        bv.set_bit(47);
        assert_eq!(bv.highest_bit_set(), Some(47));
        assert_eq!(bv.num_set_bits(), 2);
        assert_eq!(bv.indexes().collect::<Vec<_>>(), vec![5, 47]);
    }

    #[test]
    fn fixed_copy_is_sealed() {
        let mut bv = BitVector::new(8, true);
        bv.set_bit(70);
        let fixed = bv.fixed_copy();
        assert!(fixed.is_bit_set(70));
        assert!(!fixed.is_expandable());
        assert!(fixed.same_bits_set(&bv));
    }
}
