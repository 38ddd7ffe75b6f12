//! Adapter implementations for the trail repository port.

pub mod memory;
pub mod postgres;
