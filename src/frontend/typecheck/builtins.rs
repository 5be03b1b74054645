//! 内置方法
//!
//! 原始类型和 `Object` 的方法直接装入初始环境；
//! `Array[T]` / `Nillable[T]` 的方法依赖元素类型，查找时按需构造。

use super::env::{EnvKey, TypeEnvironment};
use crate::frontend::core::type_system::MonoType;
use once_cell::sync::Lazy;

/// 所有类共同的祖先
pub const OBJECT: &str = "Object";

/// 类对象方法（如 `new`）在环境中的所有者名
pub fn meta_owner(class: &str) -> String {
    format!("Class[{}]", class)
}

/// `puts` 等内置多态操作接受的联合类型
pub static PRINTABLE: Lazy<MonoType> = Lazy::new(|| {
    MonoType::Union(vec![
        MonoType::Integer,
        MonoType::String,
        MonoType::Boolean,
        MonoType::Nil,
    ])
});

/// (所有者, 方法名, 方法类型)
static PRIMITIVE_METHODS: Lazy<Vec<(&'static str, &'static str, MonoType)>> = Lazy::new(|| {
    let int_op = MonoType::func(vec![MonoType::Integer], MonoType::Integer);
    let int_cmp = MonoType::func(vec![MonoType::Integer], MonoType::Boolean);
    let to_s = MonoType::func(vec![], MonoType::String);

    vec![
        ("Integer", "+", int_op.clone()),
        ("Integer", "-", int_op.clone()),
        ("Integer", "*", int_op.clone()),
        ("Integer", "/", int_op),
        ("Integer", "==", int_cmp.clone()),
        ("Integer", "<", int_cmp.clone()),
        ("Integer", ">", int_cmp.clone()),
        ("Integer", "<=", int_cmp.clone()),
        ("Integer", ">=", int_cmp),
        ("Integer", "to_s", to_s.clone()),
        (
            "String",
            "+",
            MonoType::func(vec![MonoType::String], MonoType::String),
        ),
        (
            "String",
            "==",
            MonoType::func(vec![MonoType::String], MonoType::Boolean),
        ),
        ("String", "length", MonoType::func(vec![], MonoType::Integer)),
        (
            "Boolean",
            "==",
            MonoType::func(vec![MonoType::Boolean], MonoType::Boolean),
        ),
        ("Boolean", "to_s", to_s),
        ("Boolean", "!", MonoType::func(vec![], MonoType::Boolean)),
        (
            OBJECT,
            "puts",
            MonoType::func(vec![PRINTABLE.clone()], MonoType::Nil),
        ),
    ]
});

/// 把内置方法装入环境
pub fn install(env: &mut TypeEnvironment) {
    for (owner, name, ty) in PRIMITIVE_METHODS.iter() {
        env.insert(EnvKey::method(*owner, *name), ty.clone());
    }
}

/// 依赖元素类型的内置方法；`receiver` 需已剪枝
///
/// 返回的类型直接共享元素类型变量，调用方不应再实例化
pub fn parametric_method(
    receiver: &MonoType,
    name: &str,
) -> Option<MonoType> {
    match receiver {
        MonoType::Array(element) => {
            let element = element.as_ref().clone();
            match name {
                "first" | "last" => Some(MonoType::func(vec![], element)),
                "<<" => Some(MonoType::func(
                    vec![element.clone()],
                    MonoType::array(element),
                )),
                "length" => Some(MonoType::func(vec![], MonoType::Integer)),
                _ => None,
            }
        }
        MonoType::Nillable(inner) => {
            let inner = inner.as_ref().clone();
            match name {
                "is_some" | "is_none" => Some(MonoType::func(vec![], MonoType::Boolean)),
                "value!" => Some(MonoType::func(vec![], inner)),
                "value_or" => Some(MonoType::func(vec![inner.clone()], inner)),
                _ => None,
            }
        }
        _ => None,
    }
}
