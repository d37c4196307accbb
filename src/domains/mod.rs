//! Domains module containing business logic organized by bounded contexts.
//!
//! `resources` defines what is served; `drivers` defines where it comes
//! from.

pub mod drivers;
pub mod resources;
