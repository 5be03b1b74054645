//! 类型变量定义
//!
//! 实现 Hindley-Milner 类型系统中的变量：
//! - TypeVar: 类型变量句柄（指向求解器中的绑定单元）
//! - VarCell: 绑定单元（instance + generic 标记）
//! - VarOrigin: 变量来源（用于 "Not enough information" 报错）

use super::mono::MonoType;
use std::fmt;

/// 类型变量（用于类型推断）
///
/// 每个类型变量有一个唯一的索引，指向求解器 arena 中的绑定单元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVar(usize);

impl TypeVar {
    /// 创建新类型变量
    pub fn new(index: usize) -> Self {
        TypeVar(index)
    }

    /// 获取变量的索引
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for TypeVar {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// 类型绑定的状态
///
/// 单次赋值：一旦 Bound，只允许被剪枝压缩为等价的更具体类型
#[derive(Debug, Clone, PartialEq)]
pub enum TypeBinding {
    /// 未绑定，可接受任何类型
    Unbound,
    /// 已绑定到类型（可能是另一个变量）
    Bound(MonoType),
}

/// 变量来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarOrigin {
    /// 方法参数
    MethodParameter {
        method: String,
        param: String,
        line: usize,
    },
    /// 方法在定义完成前的返回类型（递归调用使用）
    RecursivePlaceholder { method: String, line: usize },
    /// 延迟调用的返回值占位符
    CallResult { method: String, line: usize },
    /// 数组元素
    ArrayElement { line: usize },
}

/// 类型变量绑定单元
#[derive(Debug, Clone)]
pub struct VarCell {
    pub binding: TypeBinding,
    /// `false` 时在同一作用域内共享，不随每次引用重新实例化
    pub generic: bool,
    /// 惰性分配的可读名称（a, b, c, ...）
    pub name: Option<String>,
    pub origin: Option<VarOrigin>,
}

impl VarCell {
    pub fn new(generic: bool) -> Self {
        VarCell {
            binding: TypeBinding::Unbound,
            generic,
            name: None,
            origin: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.binding, TypeBinding::Bound(_))
    }
}

/// 生成下一个变量名（a → b → … → z → aa → ab …）
pub(crate) fn successor(name: &str) -> String {
    let mut chars: Vec<u8> = name.bytes().collect();
    let mut i = chars.len();
    loop {
        if i == 0 {
            chars.insert(0, b'a');
            break;
        }
        i -= 1;
        if chars[i] == b'z' {
            chars[i] = b'a';
        } else {
            chars[i] += 1;
            break;
        }
    }
    String::from_utf8(chars).unwrap_or_else(|_| "a".to_string())
}
