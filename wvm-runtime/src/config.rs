//! Loader configuration.

use wvm_decoder::SegmentPolicy;

/// Capacities and policies for one module instance.
///
/// Stack capacities become owned, per-instance buffers — two modules never
/// alias each other's state, and capacity is a configuration parameter
/// rather than a compile-time constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Operand stack capacity, in values
    pub operand_stack_capacity: usize,
    /// Call stack capacity, in frames
    pub call_stack_capacity: usize,
    /// Branch-table scratch capacity, in labels
    pub br_table_capacity: usize,
    /// What to do with passive/declared element and data segments
    pub segment_policy: SegmentPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            operand_stack_capacity: 0x10000,
            call_stack_capacity: 0x1000,
            br_table_capacity: 0x1000,
            segment_policy: SegmentPolicy::default(),
        }
    }
}
