#![no_std]

pub mod full_math;
pub mod shares;

pub use full_math::*;
pub use shares::*;
