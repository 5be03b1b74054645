//! 类型环境
//!
//! `(所有者, 名称) → 类型` 的映射：所有者为空的是局部变量，其余是方法。
//! 基于 `im::HashMap`，进入方法体时复制环境的代价是 O(1)。

use crate::frontend::core::type_system::{MonoType, TypeSolver};
use std::fmt;

/// 环境键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvKey {
    /// 所有者类型名（方法）；`None` 为局部变量
    pub owner: Option<String>,
    pub name: String,
}

impl EnvKey {
    pub fn local(name: impl Into<String>) -> Self {
        EnvKey {
            owner: None,
            name: name.into(),
        }
    }

    pub fn method(
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        EnvKey {
            owner: Some(owner.into()),
            name: name.into(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.owner.is_none()
    }
}

impl fmt::Display for EnvKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{}#{}", owner, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// 类型环境
#[derive(Debug, Clone, Default)]
pub struct TypeEnvironment {
    bindings: im::HashMap<EnvKey, MonoType>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        key: &EnvKey,
    ) -> Option<&MonoType> {
        self.bindings.get(key)
    }

    pub fn contains(
        &self,
        key: &EnvKey,
    ) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn insert(
        &mut self,
        key: EnvKey,
        ty: MonoType,
    ) {
        self.bindings.insert(key, ty);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EnvKey, &MonoType)> {
        self.bindings.iter()
    }

    /// 查找并实例化；不存在时返回 None，由调用方决定如何处理
    pub fn retrieve(
        &self,
        solver: &mut TypeSolver,
        key: &EnvKey,
    ) -> Option<MonoType> {
        self.bindings.get(key).map(|ty| solver.instantiate(ty))
    }

    /// 去掉局部变量后的副本（方法体看不到外层的局部变量）
    pub fn without_locals(&self) -> Self {
        let mut bindings = self.bindings.clone();
        bindings.retain(|key, _| !key.is_local());
        TypeEnvironment { bindings }
    }
}
