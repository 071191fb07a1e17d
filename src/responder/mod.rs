//! Canned reply generation
//!
//! A small decision table stands in for a language model: the input is
//! case-folded, matched against ordered trigger lists and answered with one of
//! the winning category's replies, chosen through an injectable random source.

mod catalog;
mod delay;
mod generator;
mod random;

pub use catalog::*;
pub use delay::*;
pub use generator::*;
pub use random::*;
