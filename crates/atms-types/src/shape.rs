/// Identifies one proving/verification key pair: the circuit only depends on
/// how many slots it checks and how long each membership path is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CircuitShape {
    pub slot_count: usize,
    pub tree_depth: u32,
}

impl CircuitShape {
    pub fn new(slot_count: usize, tree_depth: u32) -> Self {
        Self {
            slot_count,
            tree_depth,
        }
    }
}

impl core::fmt::Display for CircuitShape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.slot_count, self.tree_depth)
    }
}
