pub mod blocks;
pub mod identifiers;
pub mod modules;
