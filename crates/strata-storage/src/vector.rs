//! Growable integer vector.
//!
//! `IntVector` is the backing store of every column and of the intermediate
//! vectors the operators produce. Its capacity starts small and doubles on
//! overflow; unlike `Vec::push`, every growth path reports allocation failure
//! as `StrataError::OutOfMemory` instead of aborting the process.

use std::slice;

use strata_common::constants::DEFAULT_VECTOR_CAPACITY;
use strata_common::error::{StrataError, StrataResult};

const STRUCTURE: &str = "vector";

/// A growable vector with doubling capacity and fallible growth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVector<T = i32> {
    /// Stored elements. `data.len()` is the logical length.
    data: Vec<T>,
    /// Logical capacity. Always `>= data.len()`.
    capacity: usize,
}

impl<T: Copy> IntVector<T> {
    /// Creates an empty vector with the default initial capacity.
    pub fn new() -> StrataResult<Self> {
        Self::with_capacity(DEFAULT_VECTOR_CAPACITY)
    }

    /// Creates an empty vector with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> StrataResult<Self> {
        let capacity = capacity.max(1);
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| StrataError::out_of_memory(STRUCTURE, capacity))?;
        Ok(Self { data, capacity })
    }

    /// Wraps an existing vector without copying.
    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        let capacity = data.len().max(1);
        Self { data, capacity }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the vector holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the logical capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the element at `pos`.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<T> {
        self.data.get(pos).copied()
    }

    /// Returns the elements as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Consumes the vector and returns its elements.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Ensures room for `additional` more elements.
    ///
    /// After a successful call the next `additional` pushes or inserts
    /// cannot fail.
    pub fn reserve(&mut self, additional: usize) -> StrataResult<()> {
        let required = self
            .data
            .len()
            .checked_add(additional)
            .ok_or_else(|| StrataError::out_of_memory(STRUCTURE, usize::MAX))?;
        self.grow_to(required)
    }

    /// Appends `value` and returns its position.
    pub fn push(&mut self, value: T) -> StrataResult<usize> {
        self.reserve(1)?;
        let pos = self.data.len();
        self.data.push(value);
        Ok(pos)
    }

    /// Inserts `value` at `pos`, shifting the tail right by one.
    pub fn insert_at(&mut self, pos: usize, value: T) -> StrataResult<()> {
        if pos > self.data.len() {
            return Err(StrataError::invalid_argument(format!(
                "insert position {pos} beyond length {}",
                self.data.len()
            )));
        }
        self.reserve(1)?;
        self.data.insert(pos, value);
        Ok(())
    }

    /// Appends every element of `other`.
    pub fn append(&mut self, other: &[T]) -> StrataResult<()> {
        self.reserve(other.len())?;
        self.data.extend_from_slice(other);
        Ok(())
    }

    /// Removes every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    fn grow_to(&mut self, required: usize) -> StrataResult<()> {
        if required <= self.capacity {
            return Ok(());
        }

        let mut new_capacity = self.capacity.max(1);
        while new_capacity < required {
            new_capacity = new_capacity
                .checked_mul(2)
                .ok_or_else(|| StrataError::out_of_memory(STRUCTURE, required))?;
        }

        self.data
            .try_reserve_exact(new_capacity - self.data.len())
            .map_err(|_| StrataError::out_of_memory(STRUCTURE, new_capacity))?;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl<T: Copy + Ord> IntVector<T> {
    /// Inserts `value` after every element `<= value` and returns its slot.
    ///
    /// The vector must already be sorted ascending.
    pub fn insert_sorted(&mut self, value: T) -> StrataResult<usize> {
        let pos = self.data.partition_point(|v| *v <= value);
        self.insert_at(pos, value)?;
        Ok(pos)
    }
}

impl<'a, T> IntoIterator for &'a IntVector<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
