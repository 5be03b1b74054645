//! 类型系统子模块
//!
//! 将类型系统拆分为多个子模块：
//! - var: 类型变量与绑定单元
//! - mono: 单态类型定义
//! - solver: 剪枝 / 统一 / 实例化 / 泛化
//! - error: 统一错误定义

pub mod error;
pub mod mono;
pub mod solver;
pub mod var;

#[cfg(test)]
mod tests;

// 重新导出主要类型
pub use error::{UnifyError, UnifyResult};
pub use mono::{MonoType, FN_OPERATOR};
pub use solver::TypeSolver;
pub use var::{TypeBinding, TypeVar, VarCell, VarOrigin};
