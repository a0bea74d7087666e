//! Unordered set with O(1) insert/erase and uniform random sampling.
//!
//! Members live in a dense vector; a side index records each member's slot so
//! erase can swap-remove. No shuffle is cached: every sampling call draws a
//! fresh permutation from the caller's RNG.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct ShuffledSet<T> {
    data: Vec<T>,
    positions: HashMap<T, usize>,
}

impl<T> Default for ShuffledSet<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<T: Copy + Eq + Hash> ShuffledSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `value` was already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.positions.contains_key(&value) {
            return false;
        }
        self.positions.insert(value, self.data.len());
        self.data.push(value);
        true
    }

    /// Returns `false` if `value` was not present.
    pub fn erase(&mut self, value: T) -> bool {
        let Some(index) = self.positions.remove(&value) else {
            return false;
        };
        self.data.swap_remove(index);
        if let Some(&moved) = self.data.get(index) {
            self.positions.insert(moved, index);
        }
        true
    }

    pub fn contains(&self, value: T) -> bool {
        self.positions.contains_key(&value)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Members in insertion-dependent storage order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// All members in a fresh random order.
    pub fn shuffled_elements<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<T> {
        let mut out = self.data.clone();
        out.shuffle(rng);
        out
    }

    /// Up to `max_count` distinct members chosen uniformly, in random order.
    pub fn shuffled_elements_with_max_count<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_count: usize,
    ) -> Vec<T> {
        let mut out = self.data.clone();
        let amount = max_count.min(out.len());
        let (chosen, _) = out.partial_shuffle(rng, amount);
        chosen.to_vec()
    }

    /// Each member independently with `probability`, in random order.
    pub fn shuffled_elements_with_probability<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        probability: f64,
    ) -> Vec<T> {
        if probability.is_nan() || probability <= 0.0 {
            return Vec::new();
        }
        if probability >= 1.0 {
            return self.shuffled_elements(rng);
        }
        let mut out: Vec<T> = self
            .data
            .iter()
            .copied()
            .filter(|_| rng.gen_bool(probability))
            .collect();
        out.shuffle(rng);
        out
    }

    pub fn random_element<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        self.data.choose(rng).copied()
    }

    /// Visits members in random order and returns the first accepted by
    /// `pred`. Only as many members as needed are drawn.
    pub fn shuffled_elements_find<R, F>(&self, rng: &mut R, mut pred: F) -> Option<T>
    where
        R: Rng + ?Sized,
        F: FnMut(T) -> bool,
    {
        let mut pool = self.data.clone();
        let len = pool.len();
        for i in 0..len {
            let j = rng.gen_range(i..len);
            pool.swap(i, j);
            if pred(pool[i]) {
                return Some(pool[i]);
            }
        }
        None
    }
}
