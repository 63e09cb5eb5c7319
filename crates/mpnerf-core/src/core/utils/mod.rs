pub mod geometry;
pub mod identifiers;
pub mod superposition;
