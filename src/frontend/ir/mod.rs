//! Typed instruction IR
//!
//! 前端产出的指令树；每条指令携带源码行号和一个由类型检查器独占写入的类型槽。
//! 指令顺序与运行时的栈纪律一致（值先被压栈，再被消费）。

pub mod build;

#[cfg(test)]
mod tests;

use crate::frontend::core::type_system::MonoType;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// 指令的类型槽
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypeSlot {
    /// 尚未推断
    #[default]
    Unset,
    /// 延迟调用点：返回类型的占位变量，等待第二遍解析
    Pending(MonoType),
    /// 已确定
    Known(MonoType),
}

impl TypeSlot {
    /// 当前记录的类型（含未完成的占位符）
    pub fn ty(&self) -> Option<&MonoType> {
        match self {
            TypeSlot::Unset => None,
            TypeSlot::Pending(ty) | TypeSlot::Known(ty) => Some(ty),
        }
    }

    /// 只有最终确定的类型
    pub fn known(&self) -> Option<&MonoType> {
        match self {
            TypeSlot::Known(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TypeSlot::Pending(_))
    }
}

/// 类型标注，例如 `Integer`、`Option[String]`、`Array[Dog]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub name: String,
    pub args: Vec<TypeAnnotation>,
}

impl TypeAnnotation {
    pub fn named(name: impl Into<String>) -> Self {
        TypeAnnotation {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(
        name: impl Into<String>,
        arg: TypeAnnotation,
    ) -> Self {
        TypeAnnotation {
            name: name.into(),
            args: vec![arg],
        }
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            let args = self
                .args
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "[{}]", args)?;
        }
        Ok(())
    }
}

/// 标注文本无法解析
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationParseError(pub String);

impl fmt::Display for AnnotationParseError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "invalid type annotation: {}", self.0)
    }
}

impl std::error::Error for AnnotationParseError {}

impl FromStr for TypeAnnotation {
    type Err = AnnotationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || AnnotationParseError(s.to_string());
        match text.find('[') {
            None => {
                if text.is_empty() || !text.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return Err(invalid());
                }
                Ok(TypeAnnotation::named(text))
            }
            Some(open) => {
                let inner = text[open + 1..].strip_suffix(']').ok_or_else(invalid)?;
                let name = &text[..open];
                if name.is_empty() {
                    return Err(invalid());
                }
                let args = split_top_level(inner)
                    .into_iter()
                    .map(TypeAnnotation::from_str)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| invalid())?;
                Ok(TypeAnnotation {
                    name: name.to_string(),
                    args,
                })
            }
        }
    }
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

impl Serialize for TypeAnnotation {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 方法参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeAnnotation>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            annotation: None,
        }
    }

    pub fn annotated(
        name: impl Into<String>,
        annotation: TypeAnnotation,
    ) -> Self {
        Param {
            name: name.into(),
            annotation: Some(annotation),
        }
    }
}

/// 指令种类
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    PushInt(i64),
    PushStr(String),
    PushTrue,
    PushFalse,
    PushNil,
    /// 当前作用域的 self
    PushSelf,
    /// 类名常量（类对象）
    PushConst(String),
    SetVar {
        name: String,
        annotation: Option<TypeAnnotation>,
    },
    PushVar(String),
    /// 当前方法的第 index 个参数
    PushArg(usize),
    Def {
        name: String,
        params: Vec<Param>,
        body: Vec<Instruction>,
    },
    Call {
        name: String,
        arg_count: usize,
        has_receiver: bool,
    },
    If {
        if_true: Vec<Instruction>,
        if_false: Vec<Instruction>,
        /// 条件表达式的值是否被使用
        used: bool,
    },
    While {
        condition: Vec<Instruction>,
        body: Vec<Instruction>,
    },
    PushArray(usize),
    Class {
        name: String,
        superclass: Option<String>,
        body: Vec<Instruction>,
        /// 完整的实例变量列表（含继承的，父类在前）；推断完成后填写
        ivars: Vec<(String, MonoType)>,
    },
    SetIvar {
        name: String,
        annotation: Option<TypeAnnotation>,
    },
    PushIvar(String),
    Pop,
}

impl InstructionKind {
    /// 指令名（调试输出用）
    pub fn name(&self) -> &'static str {
        match self {
            InstructionKind::PushInt(_) => "push_int",
            InstructionKind::PushStr(_) => "push_str",
            InstructionKind::PushTrue => "push_true",
            InstructionKind::PushFalse => "push_false",
            InstructionKind::PushNil => "push_nil",
            InstructionKind::PushSelf => "push_self",
            InstructionKind::PushConst(_) => "push_const",
            InstructionKind::SetVar { .. } => "set_var",
            InstructionKind::PushVar(_) => "push_var",
            InstructionKind::PushArg(_) => "push_arg",
            InstructionKind::Def { .. } => "def",
            InstructionKind::Call { .. } => "call",
            InstructionKind::If { .. } => "if",
            InstructionKind::While { .. } => "while",
            InstructionKind::PushArray(_) => "push_array",
            InstructionKind::Class { .. } => "class",
            InstructionKind::SetIvar { .. } => "set_ivar",
            InstructionKind::PushIvar(_) => "push_ivar",
            InstructionKind::Pop => "pop",
        }
    }
}

/// 一条指令
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub kind: InstructionKind,
    /// 源码行号
    pub line: usize,
    /// 类型槽，只由类型检查器写入
    pub slot: TypeSlot,
}

impl Instruction {
    pub fn new(
        kind: InstructionKind,
        line: usize,
    ) -> Self {
        Instruction {
            kind,
            line,
            slot: TypeSlot::Unset,
        }
    }

    /// 推断完成后的类型
    pub fn ty(&self) -> Option<&MonoType> {
        self.slot.known()
    }

    /// 调试用 JSON 形式：`{instruction, type, ...参数}`
    pub fn to_json(&self) -> Value {
        let mut node = Map::new();
        node.insert("instruction".to_string(), json!(self.kind.name()));
        node.insert(
            "type".to_string(),
            match self.slot.ty() {
                Some(ty) => json!(ty),
                None => Value::Null,
            },
        );
        node.insert("line".to_string(), json!(self.line));

        match &self.kind {
            InstructionKind::PushInt(value) => {
                node.insert("value".to_string(), json!(value));
            }
            InstructionKind::PushStr(value) => {
                node.insert("value".to_string(), json!(value));
            }
            InstructionKind::PushConst(name)
            | InstructionKind::PushVar(name)
            | InstructionKind::PushIvar(name) => {
                node.insert("name".to_string(), json!(name));
            }
            InstructionKind::SetVar { name, annotation }
            | InstructionKind::SetIvar { name, annotation } => {
                node.insert("name".to_string(), json!(name));
                if let Some(annotation) = annotation {
                    node.insert("annotation".to_string(), json!(annotation));
                }
            }
            InstructionKind::PushArg(index) => {
                node.insert("index".to_string(), json!(index));
            }
            InstructionKind::Def { name, params, body } => {
                node.insert("name".to_string(), json!(name));
                node.insert("params".to_string(), json!(params));
                node.insert("body".to_string(), body_json(body));
            }
            InstructionKind::Call {
                name,
                arg_count,
                has_receiver,
            } => {
                node.insert("name".to_string(), json!(name));
                node.insert("arg_count".to_string(), json!(arg_count));
                node.insert("has_receiver".to_string(), json!(has_receiver));
            }
            InstructionKind::If {
                if_true,
                if_false,
                used,
            } => {
                node.insert("if_true".to_string(), body_json(if_true));
                node.insert("if_false".to_string(), body_json(if_false));
                node.insert("used".to_string(), json!(used));
            }
            InstructionKind::While { condition, body } => {
                node.insert("condition".to_string(), body_json(condition));
                node.insert("body".to_string(), body_json(body));
            }
            InstructionKind::PushArray(size) => {
                node.insert("size".to_string(), json!(size));
            }
            InstructionKind::Class {
                name,
                superclass,
                body,
                ivars,
            } => {
                node.insert("name".to_string(), json!(name));
                node.insert("superclass".to_string(), json!(superclass));
                node.insert("body".to_string(), body_json(body));
                let ivars: Map<String, Value> = ivars
                    .iter()
                    .map(|(name, ty)| (name.clone(), json!(ty)))
                    .collect();
                node.insert("ivars".to_string(), Value::Object(ivars));
            }
            InstructionKind::PushTrue
            | InstructionKind::PushFalse
            | InstructionKind::PushNil
            | InstructionKind::PushSelf
            | InstructionKind::Pop => {}
        }

        Value::Object(node)
    }
}

fn body_json(body: &[Instruction]) -> Value {
    Value::Array(body.iter().map(Instruction::to_json).collect())
}
