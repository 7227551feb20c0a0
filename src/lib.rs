//! Commute simulation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod city;
pub mod simulation;
pub mod tilemap;
