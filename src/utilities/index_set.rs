/// Collection of unique indices supporting add and contains operations.
/// Uses packed bitfields where each bit represents one index's containment state.
#[derive(Clone, Debug, Default)]
pub struct IndexSet {
    /// Packed bitfields representing index containment.
    flags: Vec<u64>,
}

impl IndexSet {
    const SHIFT: usize = 6;
    const MASK: usize = 63;

    /// Gets the bundle capacity needed for the given count.
    #[inline(always)]
    pub fn get_bundle_capacity(count: usize) -> usize {
        (count + Self::MASK) >> Self::SHIFT
    }

    /// Creates a new set able to hold indices below `initial_capacity` without growing.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            flags: vec![0; Self::get_bundle_capacity(initial_capacity)],
        }
    }

    /// Checks if an index is contained in the set.
    #[inline(always)]
    pub fn contains(&self, index: usize) -> bool {
        let packed_index = index >> Self::SHIFT;
        packed_index < self.flags.len()
            && (self.flags[packed_index] & (1u64 << (index & Self::MASK))) != 0
    }

    /// Gets whether none of the given indices are in the set.
    #[inline(always)]
    pub fn can_fit(&self, indices: &[usize]) -> bool {
        indices.iter().all(|&index| !self.contains(index))
    }

    /// Adds an index, growing the set if needed.
    #[inline(always)]
    pub fn add(&mut self, index: usize) {
        let bundle_index = index >> Self::SHIFT;
        if bundle_index >= self.flags.len() {
            let new_capacity = (bundle_index + 1).next_power_of_two();
            self.flags.resize(new_capacity, 0);
        }
        debug_assert!(
            (self.flags[bundle_index] & (1u64 << (index & Self::MASK))) == 0,
            "Cannot add if it's already present!"
        );
        self.flags[bundle_index] |= 1u64 << (index & Self::MASK);
    }

    /// Clears all indices from the set while keeping its storage.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.flags.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_contains_clear() {
        let mut set = IndexSet::new(10);
        assert!(!set.contains(3));
        set.add(3);
        set.add(200);
        assert!(set.contains(3));
        assert!(set.contains(200));
        assert!(!set.contains(199));
        assert!(!set.can_fit(&[1, 200]));
        assert!(set.can_fit(&[1, 2]));
        set.clear();
        assert!(!set.contains(3));
        assert!(!set.contains(200));
        assert!(set.can_fit(&[3, 200]));
    }
}
