//! 统一错误定义

use super::mono::MonoType;
use thiserror::Error;

/// 统一失败
///
/// 携带剪枝后的两侧类型；可读的报错信息由调用方结合上下文生成
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UnifyError {
    /// 类型变量出现在要绑定的类型内部（无限类型）
    #[error("recursive unification: {ty} contains {var}")]
    Recursive { var: MonoType, ty: MonoType },

    /// 两个类型无法相等
    #[error("{left} cannot unify with {right}")]
    Clash { left: MonoType, right: MonoType },
}

impl UnifyError {
    pub fn clash(
        left: &MonoType,
        right: &MonoType,
    ) -> Self {
        UnifyError::Clash {
            left: left.clone(),
            right: right.clone(),
        }
    }
}

pub type UnifyResult = Result<(), UnifyError>;
