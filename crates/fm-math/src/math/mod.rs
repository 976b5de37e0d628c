//! Core math modules.

pub mod constrained;
pub mod normal;
pub mod roots;
pub mod score;
