//! Provides the origin-grouped table of mappings kept by the client.

use crate::mapping::Mapping;
use crate::mapping::MappingId;
use std::collections::HashMap;

/// All known mappings, bucketed by origin.
///
/// Origins iterate in the order they first appear in the data the table was
/// built from, and each bucket keeps the mappings in received order. Origins
/// that look like integers (`"10"`, `"2"`) are not sorted ahead of the rest.
/// A table is only ever built whole from a server response; it has no
/// mutators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    groups: Vec<(String, Vec<Mapping>)>,
}

impl MappingTable {
    /// Creates a new, empty `MappingTable`.
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Groups `data` by origin.
    ///
    /// Nothing is filtered or deduplicated: every input record ends up in
    /// exactly one bucket.
    pub fn from_mappings(data: impl IntoIterator<Item = Mapping>) -> Self {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<Mapping>)> = Vec::new();

        for mapping in data {
            match positions.get(&mapping.origin) {
                Some(&pos) => groups[pos].1.push(mapping),
                None => {
                    positions.insert(mapping.origin.clone(), groups.len());
                    groups.push((mapping.origin.clone(), vec![mapping]));
                }
            }
        }

        Self { groups }
    }

    /// Returns the mappings for `origin`, or `None` if the origin is unknown.
    pub fn get(&self, origin: &str) -> Option<&[Mapping]> {
        self.groups
            .iter()
            .find(|(o, _)| o == origin)
            .map(|(_, mappings)| mappings.as_slice())
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(origin, _)| origin.as_str())
    }

    /// Returns an iterator over `(origin, mappings)` pairs in origin order.
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.groups.iter())
    }

    /// Total number of mappings across all origins.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, mappings)| mappings.len()).sum()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Concatenates all buckets in origin order.
    pub fn flatten(&self) -> Vec<Mapping> {
        self.groups
            .iter()
            .flat_map(|(_, mappings)| mappings.iter().cloned())
            .collect()
    }

    /// Returns the first mapping with `id`, scanning origins in order.
    pub fn find(&self, id: &MappingId) -> Option<&Mapping> {
        self.mappings().find(|m| &m.mapping_id == id)
    }

    /// Returns the first mapping with `id` whose `active` flag differs from
    /// `status`, or `None` when there is nothing to change.
    ///
    /// The scan covers origins in table order, then mappings in bucket order,
    /// and stops at the first hit.
    pub fn find_mismatched(&self, id: &MappingId, status: bool) -> Option<&Mapping> {
        self.mappings().find(|m| &m.mapping_id == id && m.active != status)
    }

    fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.groups.iter().flat_map(|(_, mappings)| mappings.iter())
    }
}

impl FromIterator<Mapping> for MappingTable {
    fn from_iter<T: IntoIterator<Item = Mapping>>(iter: T) -> Self {
        Self::from_mappings(iter)
    }
}

/// An iterator over the buckets of a `MappingTable`.
///
/// This struct is created by the `iter` method on `MappingTable`.
pub struct Iter<'a>(std::slice::Iter<'a, (String, Vec<Mapping>)>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [Mapping]);

    fn next(&mut self) -> Option<Self::Item> {
        self.0
            .next()
            .map(|(origin, mappings)| (origin.as_str(), mappings.as_slice()))
    }
}

/// Allows `MappingTable` to be used directly in `for` loops.
impl<'a> IntoIterator for &'a MappingTable {
    type Item = (&'a str, &'a [Mapping]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
