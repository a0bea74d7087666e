//! Arena storage with a LIFO freelist of released slots.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::handle::Handle;

/// Values of `T` addressed by `Handle<Tag>`.
///
/// Liveness is only tracked in debug builds; release builds trust callers not
/// to touch released handles.
pub struct ObjectPool<H, T> {
    values: Vec<T>,
    unused: Vec<usize>,
    #[cfg(debug_assertions)]
    engaged: Vec<bool>,
    _handle: PhantomData<fn(H)>,
}

impl<H, T> Default for ObjectPool<H, T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            unused: Vec::new(),
            #[cfg(debug_assertions)]
            engaged: Vec::new(),
            _handle: PhantomData,
        }
    }
}

impl<Tag, T: Default> ObjectPool<Handle<Tag>, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, reusing the most recently released slot if any.
    pub fn create(&mut self, value: T) -> Handle<Tag> {
        let index = match self.unused.pop() {
            Some(index) => {
                self.values[index] = value;
                index
            }
            None => {
                self.values.push(value);
                #[cfg(debug_assertions)]
                self.engaged.push(false);
                self.values.len() - 1
            }
        };
        #[cfg(debug_assertions)]
        {
            self.engaged[index] = true;
        }
        Handle::from_index(index)
    }

    /// Returns the slot to the freelist. Releasing the last live value
    /// empties the pool entirely.
    pub fn release(&mut self, handle: Handle<Tag>) {
        let index = handle.index();
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.engaged[index], "double release of pool slot {}", index);
            self.engaged[index] = false;
        }
        if self.unused.len() + 1 == self.values.len() {
            self.clear();
            return;
        }
        self.values[index] = T::default();
        self.unused.push(index);
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.unused.clear();
        #[cfg(debug_assertions)]
        self.engaged.clear();
    }

    /// Unchecked lookup: a released slot yields its reset value, an unknown
    /// handle yields `None`.
    pub fn get(&self, handle: Handle<Tag>) -> Option<&T> {
        handle.get().and_then(|h| self.values.get(h.index()))
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.values.len() - self.unused.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_engaged(&self, _index: usize) {
        #[cfg(debug_assertions)]
        debug_assert!(
            self.engaged.get(_index).copied().unwrap_or(false),
            "access through released pool slot {}",
            _index
        );
    }
}

impl<Tag, T: Default> Index<Handle<Tag>> for ObjectPool<Handle<Tag>, T> {
    type Output = T;

    fn index(&self, handle: Handle<Tag>) -> &T {
        let index = handle.index();
        self.check_engaged(index);
        &self.values[index]
    }
}

impl<Tag, T: Default> IndexMut<Handle<Tag>> for ObjectPool<Handle<Tag>, T> {
    fn index_mut(&mut self, handle: Handle<Tag>) -> &mut T {
        let index = handle.index();
        self.check_engaged(index);
        &mut self.values[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Piece;

    #[test]
    fn test_indices_increase_until_release() {
        let mut pool: ObjectPool<Piece, i32> = ObjectPool::new();
        let handles: Vec<Piece> = (0..4).map(|v| pool.create(v)).collect();
        assert_eq!(
            handles,
            vec![Piece::new(0), Piece::new(1), Piece::new(2), Piece::new(3)]
        );
        assert_eq!(pool[Piece::new(2)], 2);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_release_is_reused_lifo() {
        let mut pool: ObjectPool<Piece, String> = ObjectPool::new();
        let a = pool.create("a".into());
        let b = pool.create("b".into());
        let _c = pool.create("c".into());
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.create("d".into()), b);
        assert_eq!(pool.create("e".into()), a);
        assert_eq!(pool[a], "e");
    }

    #[test]
    fn test_release_last_clears_pool() {
        let mut pool: ObjectPool<Piece, i32> = ObjectPool::new();
        let a = pool.create(1);
        let b = pool.create(2);
        pool.release(a);
        pool.release(b);
        assert!(pool.is_empty());
        assert_eq!(pool.create(3), Piece::new(0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "double release")]
    fn test_double_release_panics_in_debug() {
        let mut pool: ObjectPool<Piece, i32> = ObjectPool::new();
        let a = pool.create(1);
        let _b = pool.create(2);
        pool.release(a);
        pool.release(a);
    }
}
