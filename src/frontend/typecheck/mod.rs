//! 类型检查器模块
//!
//! 对指令树进行 Hindley-Milner 风格的类型推断，支持：
//! - let 多态（方法类型的泛化与实例化）
//! - 名义类、同质数组、可空类型与联合类型
//! - 接收者未知的调用的两遍延迟解析

use serde_json::{json, Value};

pub mod builtins;
pub mod classes;
pub mod deferred;
pub mod env;
pub mod errors;
pub mod infer;

#[cfg(test)]
mod tests;

pub use crate::frontend::core::type_system::{MonoType, TypeSolver, TypeVar};
pub use classes::{ClassRegistry, ClassType};
pub use env::{EnvKey, TypeEnvironment};
pub use errors::{ClashContext, TypeError, TypeResult};
pub use infer::TypeInferrer;

use crate::frontend::ir::Instruction;
use crate::util::config::CheckerConfig;

/// 推断完成的程序
///
/// 每条指令的类型槽都是 `Known` 且已完全剪枝
#[derive(Debug, Clone)]
pub struct TypedProgram {
    pub instructions: Vec<Instruction>,
    /// 实例变量类型已解析的类注册表
    pub classes: ClassRegistry,
    /// 顶层最后一个值的类型
    pub result_type: MonoType,
}

impl TypedProgram {
    /// 类的完整实例变量列表（含继承的，父类在前）
    pub fn class_ivars(
        &self,
        name: &str,
    ) -> Vec<(String, MonoType)> {
        self.classes.all_ivars(name)
    }

    /// 调试用 JSON：每个节点形如 `{instruction, type, ...}`
    pub fn to_json(&self) -> Value {
        json!({
            "result_type": self.result_type,
            "instructions": self.instructions.iter().map(Instruction::to_json).collect::<Vec<_>>(),
        })
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
    }
}

/// 使用默认配置检查程序
pub fn check_program(instructions: Vec<Instruction>) -> TypeResult<TypedProgram> {
    check_program_with_config(instructions, CheckerConfig::default())
}

pub fn check_program_with_config(
    instructions: Vec<Instruction>,
    config: CheckerConfig,
) -> TypeResult<TypedProgram> {
    TypeInferrer::with_config(config).check(instructions)
}
