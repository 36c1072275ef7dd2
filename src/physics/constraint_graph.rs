use tracing::trace;

use crate::physics::contact_manifold::ContactPair;
use crate::physics::error::SolverError;
use crate::physics::handles::{ContactId, SolverBodyRef};
use crate::physics::solver_bodies::SolverBodies;
use crate::utilities::index_set::IndexSet;

/// Default number of colors tried before a contact is sent to the overflow bucket.
pub const GRAPH_COLOR_COUNT: usize = 24;

/// Contacts split into body-disjoint colors plus a bucket solved one contact at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorPartition {
    /// No two contacts of a color share a dynamic body.
    pub colors: Vec<Vec<ContactId>>,
    pub overflow: Vec<ContactId>,
}

impl ColorPartition {
    /// Total number of contacts in the partition.
    pub fn contact_count(&self) -> usize {
        self.colors.iter().map(Vec::len).sum::<usize>() + self.overflow.len()
    }

    /// Checks that every contact exists in `pairs`.
    pub fn validate_range(&self, contact_count: usize) -> Result<(), SolverError> {
        let all = self.colors.iter().flatten().chain(self.overflow.iter());
        for contact in all {
            if contact.index() >= contact_count {
                return Err(SolverError::ContactOutOfRange {
                    contact: contact.0,
                    contact_count,
                });
            }
        }
        Ok(())
    }

    /// Checks that every contact exists in `pairs` and that no color touches a dynamic body twice.
    pub fn validate(&self, pairs: &[ContactPair], bodies: &SolverBodies) -> Result<(), SolverError> {
        self.validate_range(pairs.len())?;
        let mut touched = IndexSet::new(bodies.len());
        for (color_index, color) in self.colors.iter().enumerate() {
            touched.clear();
            for contact in color {
                let pair = &pairs[contact.index()];
                let other = (pair.body_b != pair.body_a).then_some(pair.body_b);
                for body in std::iter::once(pair.body_a).chain(other) {
                    if let SolverBodyRef::Dynamic(handle) = bodies.resolve(body) {
                        if touched.contains(handle.index()) {
                            return Err(SolverError::ColorConflict {
                                color: color_index,
                                body: body.0,
                            });
                        }
                        touched.add(handle.index());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Greedy graph coloring of the contact conflict graph.
///
/// Each color keeps a bitset of the dynamic bodies it already holds. A contact goes to the first color where none of
/// its dynamic bodies is present. Contacts against static bodies skip color 0. Contacts that fit nowhere go to
/// overflow.
#[derive(Clone, Debug)]
pub struct ConstraintGraph {
    color_count: usize,
    body_sets: Vec<IndexSet>,
}

impl Default for ConstraintGraph {
    fn default() -> Self {
        Self::new(GRAPH_COLOR_COUNT)
    }
}

impl ConstraintGraph {
    pub fn new(color_count: usize) -> Self {
        Self {
            color_count,
            body_sets: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn color_count(&self) -> usize {
        self.color_count
    }

    /// Partitions `pairs` into colors. Pairs without points are left out.
    pub fn color(&mut self, pairs: &[ContactPair], bodies: &SolverBodies) -> ColorPartition {
        self.body_sets.resize_with(self.color_count, IndexSet::default);
        for set in self.body_sets.iter_mut() {
            set.clear();
        }
        let mut colors = vec![Vec::new(); self.color_count];
        let mut overflow = Vec::new();

        for (index, pair) in pairs.iter().enumerate() {
            if pair.manifold.point_count == 0 {
                continue;
            }
            let contact = ContactId(index as u32);
            let body_a = bodies.resolve(pair.body_a).handle().map(|h| h.index());
            let body_b = bodies.resolve(pair.body_b).handle().map(|h| h.index());
            match self.assign_color(body_a, body_b) {
                Some(color) => colors[color].push(contact),
                None => overflow.push(contact),
            }
        }

        colors.retain(|color| !color.is_empty());
        trace!(
            color_count = colors.len(),
            overflow_count = overflow.len(),
            "colored contacts"
        );
        ColorPartition { colors, overflow }
    }

    fn assign_color(&mut self, body_a: Option<usize>, body_b: Option<usize>) -> Option<usize> {
        match (body_a, body_b) {
            (Some(a), Some(b)) => {
                let color = (0..self.color_count).find(|&i| self.body_sets[i].can_fit(&[a, b]))?;
                self.body_sets[color].add(a);
                // A body touching itself is only marked once.
                if b != a {
                    self.body_sets[color].add(b);
                }
                Some(color)
            }
            (Some(body), None) | (None, Some(body)) => {
                let color = (1..self.color_count).find(|&i| !self.body_sets[i].contains(body))?;
                self.body_sets[color].add(body);
                Some(color)
            }
            (None, None) => None,
        }
    }
}
