//! Shared helpers that do not belong to a single feature module

pub mod text;
