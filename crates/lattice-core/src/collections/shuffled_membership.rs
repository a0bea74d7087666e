//! One `ShuffledSet` per group.

use std::hash::Hash;

use super::set_difference::{visit_set_difference, SetSide};
use super::shuffled_set::ShuffledSet;
use crate::handle::Handle;

#[derive(Debug, Clone)]
pub struct ShuffledMembership<G, T> {
    groups: Vec<ShuffledSet<T>>,
    _group: std::marker::PhantomData<fn(G)>,
}

impl<Tag, T: Copy + Eq + Hash> ShuffledMembership<Handle<Tag>, T> {
    pub fn new(num_groups: usize) -> Self {
        Self {
            groups: (0..num_groups).map(|_| ShuffledSet::new()).collect(),
            _group: std::marker::PhantomData,
        }
    }

    /// Moves `item` from `old_groups` to `new_groups`. Both lists must be
    /// sorted and unique; groups present in both are left untouched.
    pub fn change_membership(
        &mut self,
        item: T,
        old_groups: &[Handle<Tag>],
        new_groups: &[Handle<Tag>],
    ) {
        let groups = &mut self.groups;
        visit_set_difference(old_groups, new_groups, |side| match side {
            SetSide::OnlyLeft(group) => {
                groups[group.index()].erase(item);
            }
            SetSide::OnlyRight(group) => {
                groups[group.index()].insert(item);
            }
            SetSide::Both(_) => {}
        });
    }

    /// Members of `group`. The empty group is treated as empty.
    pub fn group(&self, group: Handle<Tag>) -> Option<&ShuffledSet<T>> {
        group.get().and_then(|g| self.groups.get(g.index()))
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }
}
