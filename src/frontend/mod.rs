//! Frontend type-checking pipeline
//!
//! This module contains the instruction IR, the type model and the type checker.
//! The frontend turns an untyped instruction tree into a fully typed one.

use thiserror::Error;
use tracing::debug;

pub mod core;
pub mod ir;
pub mod typecheck;

use crate::util::config::{CheckerConfig, ConfigError};
use ir::Instruction;
use std::path::Path;
use typecheck::{TypeError, TypedProgram};

/// Checker context
#[derive(Debug, Default, Clone)]
pub struct Checker {
    config: CheckerConfig,
}

impl Checker {
    /// Create a checker with default settings
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Create a checker from a project file (defaults when it is missing)
    pub fn from_config_file(path: &Path) -> Result<Self, CheckError> {
        let config = CheckerConfig::load_or_default(path)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Type-check an instruction tree
    pub fn check(
        &self,
        instructions: Vec<Instruction>,
    ) -> Result<TypedProgram, CheckError> {
        debug!("Starting type checking...");
        let program = typecheck::check_program_with_config(instructions, self.config.clone())?;
        debug!("Type checking successful: {}", program.result_type);
        Ok(program)
    }
}

/// Checking errors
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Type error: {0}")]
    Type(#[from] TypeError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
