pub mod analysis;
pub mod average;
pub mod shared;
