#![forbid(unsafe_code)]

pub mod allocation;
pub mod model;
pub mod random;
pub mod time;

pub use allocation::{Allocation, AllocationEngine, SubjectAllocation};
pub use random::{RandomSource, SeededRandom, ThreadRandom, shuffle};
pub use time::Clock;
