//! Tab group entity: membership, active tab, pinning, focus history and
//! MRU cycling.

mod cycle;
mod ordering;
mod types;

pub use types::Group;

#[cfg(test)]
pub(crate) use types::test_helpers;
