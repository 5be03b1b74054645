//! 错误收集和报告
//!
//! 定义类型检查过程中的所有错误类型。所有错误都是终止性的：
//! 第一个错误就会中止整个分析。

use thiserror::Error;

/// 类型错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    /// 无限类型（出现检查失败）
    #[error("{message}")]
    RecursiveUnification { message: String, line: Option<usize> },

    /// 类型冲突；消息由 [`ClashContext`] 组合
    #[error("{message}")]
    TypeClash { message: String, line: Option<usize> },

    /// 未定义的变量 / 参数 / 方法 / 常量 / 实例变量 / 类型名
    #[error("{message}")]
    UndefinedSymbol {
        name: String,
        message: String,
        line: Option<usize>,
    },

    /// 参数个数不匹配（在任何类型比较之前检查）
    #[error("method {method} expects {expected} arguments, got {found}{}", line_suffix(.line))]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
        line: Option<usize>,
    },

    /// 信息不足以确定类型
    #[error("{message}")]
    NotEnoughInformation { message: String, line: Option<usize> },

    /// 栈下溢等不合法的指令树
    #[error("malformed program: {message}{}", line_suffix(.line))]
    MalformedProgram { message: String, line: Option<usize> },
}

impl TypeError {
    /// 获取错误所在行
    pub fn line(&self) -> Option<usize> {
        match self {
            TypeError::RecursiveUnification { line, .. } => *line,
            TypeError::TypeClash { line, .. } => *line,
            TypeError::UndefinedSymbol { line, .. } => *line,
            TypeError::ArgumentCount { line, .. } => *line,
            TypeError::NotEnoughInformation { line, .. } => *line,
            TypeError::MalformedProgram { line, .. } => *line,
        }
    }

    pub fn undefined(
        name: impl Into<String>,
        message: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        TypeError::UndefinedSymbol {
            name: name.into(),
            message: message.into(),
            line,
        }
    }

    pub fn not_enough_information(
        message: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        TypeError::NotEnoughInformation {
            message: message.into(),
            line,
        }
    }

    pub fn malformed(
        message: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        TypeError::MalformedProgram {
            message: message.into(),
            line,
        }
    }
}

/// 类型检查结果
pub type TypeResult<T> = Result<T, TypeError>;

/// ` (line N)` 后缀；行号未知时为空
pub fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" (line {})", line),
        None => String::new(),
    }
}

/// 类型冲突发生的上下文，决定报错信息的措辞
///
/// `expected` 是已确立的一侧（声明的参数类型、变量已有的类型、标注），
/// `found` 是新出现的一侧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClashContext {
    /// 方法调用的第 `index` 个参数（从 1 开始）
    MethodArgument {
        owner: String,
        method: String,
        index: usize,
    },
    IfCondition,
    WhileCondition,
    IfBranches,
    /// 变量或实例变量的重新赋值
    Reassignment { name: String },
    ArrayElement,
    /// 显式类型标注
    Annotation,
    /// 第二遍解析延迟调用；`owner` 是已解析的接收者类型
    DeferredCall { owner: String, method: String },
    Plain,
}

impl ClashContext {
    /// 组合报错信息
    pub fn message(
        &self,
        expected: &str,
        found: &str,
        line: Option<usize>,
    ) -> String {
        let suffix = line_suffix(&line);
        match self {
            ClashContext::MethodArgument {
                owner,
                method,
                index,
            } => format!(
                "`{}#{}` argument {} has type {}, but you passed {}{}",
                owner, method, index, expected, found, suffix
            ),
            ClashContext::IfCondition => {
                format!("`if` condition must be Boolean, got {}{}", found, suffix)
            }
            ClashContext::WhileCondition => {
                format!("`while` condition must be Boolean, got {}{}", found, suffix)
            }
            ClashContext::IfBranches => format!(
                "one branch of `if` has type {} and the other has type {}{}",
                expected, found, suffix
            ),
            ClashContext::Reassignment { name } => format!(
                "the variable `{}` has type {} already; you cannot change it to type {}{}",
                name, expected, found, suffix
            ),
            ClashContext::ArrayElement => format!(
                "the array contains type {} but you are trying to push type {}{}",
                expected, found, suffix
            ),
            ClashContext::Annotation => {
                format!("cannot constrain {} to {}{}", expected, found, suffix)
            }
            ClashContext::DeferredCall { owner, method } => format!(
                "`{}#{}` resolved to {}, which cannot unify with {}{}",
                owner, method, expected, found, suffix
            ),
            ClashContext::Plain => format!("{} cannot unify with {}{}", expected, found, suffix),
        }
    }
}
