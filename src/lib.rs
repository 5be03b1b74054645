//! Mya type inference core
//!
//! A Hindley–Milner style type checker for the instruction IR of a small
//! Ruby-like language, extended with nominal classes, homogeneous arrays,
//! optional ("nillable") values and union types.
//!
//! # Example
//!
//! ```
//! use mya::frontend::ir::build::*;
//! use mya::MonoType;
//!
//! // a = 1; a = 2; a
//! let program = vec![
//!     push_int(1, 1),
//!     set_var("a", 1),
//!     push_int(2, 1),
//!     set_var("a", 1),
//!     push_var("a", 1),
//! ];
//! let typed = mya::check(program).unwrap();
//! assert_eq!(typed.result_type, MonoType::Integer);
//! ```

#![doc(html_root_url = "https://docs.rs/mya")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod frontend;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

pub use frontend::core::type_system::MonoType;
pub use frontend::ir::{Instruction, InstructionKind, Param, TypeAnnotation, TypeSlot};
pub use frontend::typecheck::{TypeError, TypedProgram};
pub use frontend::Checker;

use crate::util::config::CheckerConfig;
use std::path::Path;
use tracing::debug;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Type-check an instruction tree with default settings
pub fn check(instructions: Vec<Instruction>) -> Result<TypedProgram> {
    debug!("check called with {} instructions", instructions.len());
    let program = Checker::new()
        .check(instructions)
        .context("type checking failed")?;
    Ok(program)
}

/// Type-check an instruction tree with settings from a project file
///
/// A missing file means default settings.
pub fn check_with_config_file(
    instructions: Vec<Instruction>,
    config_path: &Path,
) -> Result<TypedProgram> {
    let config = CheckerConfig::load_or_default(config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
    debug!("loaded checker config: {:?}", config);
    let program = Checker::with_config(config)
        .check(instructions)
        .context("type checking failed")?;
    Ok(program)
}
