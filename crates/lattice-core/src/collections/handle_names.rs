//! Bidirectional name registry.

use std::collections::HashMap;

use crate::handle::Handle;

/// Maps names to handles in the order the names were given, and back.
#[derive(Debug, Clone)]
pub struct HandleNames<H> {
    names: Vec<String>,
    lookup: HashMap<String, H>,
}

impl<H> Default for HandleNames<H> {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            lookup: HashMap::new(),
        }
    }
}

impl<Tag> HandleNames<Handle<Tag>> {
    /// The i-th name receives handle `i`. Later duplicates are ignored for
    /// lookup.
    pub fn new(names: Vec<String>) -> Self {
        let mut lookup = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            lookup.entry(name.clone()).or_insert_with(|| Handle::from_index(i));
        }
        Self { names, lookup }
    }

    /// Empty handle for unknown names.
    pub fn to_handle(&self, name: &str) -> Handle<Tag> {
        self.lookup.get(name).copied().unwrap_or(Handle::EMPTY)
    }

    /// Sorted, de-duplicated handles of the known names.
    pub fn to_handles<S: AsRef<str>>(&self, names: &[S]) -> Vec<Handle<Tag>> {
        let mut handles: Vec<Handle<Tag>> = names
            .iter()
            .map(|name| self.to_handle(name.as_ref()))
            .filter(|h| !h.is_empty())
            .collect();
        handles.sort();
        handles.dedup();
        handles
    }

    pub fn to_name(&self, handle: Handle<Tag>) -> Option<&str> {
        handle
            .get()
            .and_then(|h| self.names.get(h.index()))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<Tag>, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (Handle::from_index(i), name.as_str()))
    }
}

impl<H> HandleNames<H> {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
