use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::Bitable;

/// A set of `Bitable` values packed into a `u32`.
pub struct Bitmask<T: Bitable>(u32, PhantomData<T>);

impl<T: Bitable> Bitmask<T> {
    /// Create a new bitmask from a slice of values.
    pub fn new(values: &[T]) -> Self {
        let mut mask = Self::empty();
        for value in values {
            mask.insert(*value);
        }
        mask
    }

    /// Create an empty bitmask.
    pub const fn empty() -> Self {
        Self(0, PhantomData)
    }

    /// Create a bitmask from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits, PhantomData)
    }

    /// Raw bits of the mask.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        (self.0 & value.bit()) != 0
    }

    #[inline]
    pub fn insert(&mut self, value: T) {
        self.0 |= value.bit();
    }

    #[inline]
    pub fn remove(&mut self, value: T) {
        self.0 &= !value.bit();
    }

    /// Insert or remove `value` depending on `on`.
    #[inline]
    pub fn set(&mut self, value: T, on: bool) {
        if on {
            self.insert(value);
        } else {
            self.remove(value);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Values present in exactly one of the two masks.
    #[inline]
    pub fn toggled(&self, other: &Bitmask<T>) -> Bitmask<T> {
        Self::from_bits(self.0 ^ other.0)
    }

    /// Iterate over the contained values in `Bitable::ALL` order.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            bits: self.0,
            rest: T::ALL.iter(),
        }
    }
}

/// Iterator over the values of a [`Bitmask`].
pub struct Iter<T: Bitable> {
    bits: u32,
    rest: std::slice::Iter<'static, T>,
}

impl<T: Bitable> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.rest.by_ref().copied().find(|v| self.bits & v.bit() != 0)
    }
}

impl<T: Bitable> IntoIterator for Bitmask<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Iter<T> {
        self.iter()
    }
}

impl<T: Bitable> FromIterator<T> for Bitmask<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut mask = Self::empty();
        for value in iter {
            mask.insert(value);
        }
        mask
    }
}

impl<T: Bitable> Clone for Bitmask<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Bitable> Copy for Bitmask<T> {}

impl<T: Bitable> Default for Bitmask<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Bitable> PartialEq for Bitmask<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Bitable> Eq for Bitmask<T> {}

impl<T: Bitable> Hash for Bitmask<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T: Bitable + fmt::Debug> fmt::Debug for Bitmask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
