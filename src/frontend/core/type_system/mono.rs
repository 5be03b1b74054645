//! 单态类型定义
//!
//! 实现类型系统的值域：
//! - 原始类型：Integer / String / Boolean / Nil
//! - 类型变量：指向求解器中的绑定单元
//! - 类型算子：Fn / Union / Array / Nillable / Class / Meta

use super::var::TypeVar;
use serde::{Serialize, Serializer};
use std::fmt;

/// 函数类型算子名
pub const FN_OPERATOR: &str = "->";

/// 单态类型
///
/// 推断过程中可能包含类型变量；推断完成后对后端可见的类型都是剪枝后的具体类型
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MonoType {
    /// 整数类型
    Integer,
    /// 字符串类型
    String,
    /// 布尔类型
    Boolean,
    /// nil
    Nil,
    /// 类型变量（推断中）
    TypeVar(TypeVar),
    /// 函数类型
    Fn {
        /// 参数类型列表
        params: Vec<MonoType>,
        /// 返回类型
        return_type: Box<MonoType>,
    },
    /// 联合类型 `T1 | T2`（内建多态操作使用）
    Union(Vec<MonoType>),
    /// 同质数组类型
    Array(Box<MonoType>),
    /// 可空类型
    Nillable(Box<MonoType>),
    /// 类的实例类型（实例变量记录在类注册表中）
    Class(String),
    /// 类对象本身的类型（`Foo.new` 的接收者）
    Meta(String),
}

impl MonoType {
    /// 构造函数类型
    pub fn func(
        params: Vec<MonoType>,
        return_type: MonoType,
    ) -> Self {
        MonoType::Fn {
            params,
            return_type: Box::new(return_type),
        }
    }

    pub fn array(element: MonoType) -> Self {
        MonoType::Array(Box::new(element))
    }

    pub fn nillable(inner: MonoType) -> Self {
        MonoType::Nillable(Box::new(inner))
    }

    pub fn class(name: impl Into<String>) -> Self {
        MonoType::Class(name.into())
    }

    pub fn meta(name: impl Into<String>) -> Self {
        MonoType::Meta(name.into())
    }

    /// 获取类型变量（如果是）
    pub fn type_var(&self) -> Option<TypeVar> {
        match self {
            MonoType::TypeVar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, MonoType::TypeVar(_))
    }

    /// 是否有扁平的原生表示（无需动态/可选包装）
    pub fn is_native(&self) -> bool {
        matches!(self, MonoType::Integer | MonoType::Boolean | MonoType::Nil)
    }

    /// 类型算子名；类型变量返回 None
    ///
    /// 两个算子只有在名称和参数个数都相同时才能统一
    pub fn operator_name(&self) -> Option<String> {
        match self {
            MonoType::Integer => Some("Integer".to_string()),
            MonoType::String => Some("String".to_string()),
            MonoType::Boolean => Some("Boolean".to_string()),
            MonoType::Nil => Some("Nil".to_string()),
            MonoType::TypeVar(_) => None,
            MonoType::Fn { .. } => Some(FN_OPERATOR.to_string()),
            MonoType::Union(_) => Some("Union".to_string()),
            MonoType::Array(_) => Some("Array".to_string()),
            MonoType::Nillable(_) => Some("Nillable".to_string()),
            MonoType::Class(name) => Some(name.clone()),
            MonoType::Meta(name) => Some(format!("Class[{}]", name)),
        }
    }

    /// 类型参数（函数类型的返回类型排在最后）
    pub fn type_args(&self) -> Vec<&MonoType> {
        match self {
            MonoType::Fn {
                params,
                return_type,
            } => params
                .iter()
                .chain(std::iter::once(return_type.as_ref()))
                .collect(),
            MonoType::Union(members) => members.iter().collect(),
            MonoType::Array(inner) | MonoType::Nillable(inner) => vec![inner.as_ref()],
            _ => Vec::new(),
        }
    }

    /// 参数个数
    pub fn arity(&self) -> usize {
        match self {
            MonoType::Fn { params, .. } => params.len() + 1,
            MonoType::Union(members) => members.len(),
            MonoType::Array(_) | MonoType::Nillable(_) => 1,
            _ => 0,
        }
    }

    /// 用新的参数列表重建同一个算子
    ///
    /// `args` 的长度必须与 `arity()` 一致
    pub fn with_args(
        &self,
        mut args: Vec<MonoType>,
    ) -> MonoType {
        match self {
            MonoType::Fn { .. } => {
                let return_type = args.pop().unwrap_or(MonoType::Nil);
                MonoType::func(args, return_type)
            }
            MonoType::Union(_) => MonoType::Union(args),
            MonoType::Array(_) => MonoType::array(args.pop().unwrap_or(MonoType::Nil)),
            MonoType::Nillable(_) => MonoType::nillable(args.pop().unwrap_or(MonoType::Nil)),
            _ => self.clone(),
        }
    }

    /// 对函数类型返回 (参数, 返回类型)
    pub fn as_fn(&self) -> Option<(&[MonoType], &MonoType)> {
        match self {
            MonoType::Fn {
                params,
                return_type,
            } => Some((params, return_type)),
            _ => None,
        }
    }

    /// 方法查找时使用的所有者名
    pub fn owner_name(&self) -> Option<String> {
        match self {
            MonoType::TypeVar(_) | MonoType::Fn { .. } | MonoType::Union(_) => None,
            other => other.operator_name(),
        }
    }

    /// 获取类型的字符串描述（类型变量显示为 t{n}）
    pub fn type_name(&self) -> String {
        match self {
            MonoType::TypeVar(v) => v.to_string(),
            MonoType::Fn {
                params,
                return_type,
            } => {
                let params_str = params
                    .iter()
                    .map(|t| t.type_name())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("([{}] -> {})", params_str, return_type.type_name())
            }
            MonoType::Union(members) => {
                format!(
                    "({})",
                    members
                        .iter()
                        .map(|t| t.type_name())
                        .collect::<Vec<_>>()
                        .join(" | ")
                )
            }
            MonoType::Array(inner) => format!("Array[{}]", inner.type_name()),
            MonoType::Nillable(inner) => format!("Nillable[{}]", inner.type_name()),
            other => other.operator_name().unwrap_or_default(),
        }
    }
}

impl fmt::Display for MonoType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

impl Serialize for MonoType {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
