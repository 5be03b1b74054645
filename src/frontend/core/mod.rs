//! Core algorithm layer
//! Contains the type model and the unification engine

pub mod type_system;

// Re-export commonly used items
pub use type_system::{MonoType, TypeSolver, TypeVar, UnifyError};
