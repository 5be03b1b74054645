//! 类型检查器测试模块

mod deferred;
mod polymorphism;

use super::{check_program, TypeError, TypedProgram};
use crate::frontend::ir::Instruction;

fn check_ok(program: Vec<Instruction>) -> TypedProgram {
    check_program(program).unwrap_or_else(|e| panic!("unexpected type error: {}", e))
}

fn check_err(program: Vec<Instruction>) -> TypeError {
    match check_program(program) {
        Ok(typed) => panic!("expected a type error, got {}", typed.result_type),
        Err(e) => e,
    }
}
