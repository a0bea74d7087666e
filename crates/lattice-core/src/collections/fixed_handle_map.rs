//! Dense lookup table with one slot per handle.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::handle::Handle;

/// A fixed-length array of `T` addressed by `Handle<Tag>`.
pub struct FixedHandleMap<H, T> {
    values: Vec<T>,
    _handle: PhantomData<fn(H)>,
}

impl<H, T: Clone> Clone for FixedHandleMap<H, T> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            _handle: PhantomData,
        }
    }
}

impl<H, T: std::fmt::Debug> std::fmt::Debug for FixedHandleMap<H, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

impl<H, T> Default for FixedHandleMap<H, T> {
    fn default() -> Self {
        Self::from_vec(Vec::new())
    }
}

impl<H, T> FixedHandleMap<H, T> {
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            values,
            _handle: PhantomData,
        }
    }

    /// `len` slots, each filled with `T::default()`.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::from_vec(std::iter::repeat_with(T::default).take(len).collect())
    }

    pub fn filled(len: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::from_vec(vec![value; len])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<Tag, T> FixedHandleMap<Handle<Tag>, T> {
    /// `None` for the empty handle or one past the end.
    pub fn get(&self, handle: Handle<Tag>) -> Option<&T> {
        handle.get().and_then(|h| self.values.get(h.index()))
    }

    pub fn get_mut(&mut self, handle: Handle<Tag>) -> Option<&mut T> {
        handle.get().and_then(|h| self.values.get_mut(h.index()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<Tag>, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (Handle::from_index(i), v))
    }
}

impl<Tag, T> Index<Handle<Tag>> for FixedHandleMap<Handle<Tag>, T> {
    type Output = T;

    fn index(&self, handle: Handle<Tag>) -> &T {
        &self.values[handle.index()]
    }
}

impl<Tag, T> IndexMut<Handle<Tag>> for FixedHandleMap<Handle<Tag>, T> {
    fn index_mut(&mut self, handle: Handle<Tag>) -> &mut T {
        &mut self.values[handle.index()]
    }
}

impl<H, T> FromIterator<T> for FixedHandleMap<H, T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}
