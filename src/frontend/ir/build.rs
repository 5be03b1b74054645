//! 指令构造函数
//!
//! 供前端（以及测试）按栈纪律拼装指令树

use super::{Instruction, InstructionKind, Param, TypeAnnotation};

pub fn push_int(
    value: i64,
    line: usize,
) -> Instruction {
    Instruction::new(InstructionKind::PushInt(value), line)
}

pub fn push_str(
    value: impl Into<String>,
    line: usize,
) -> Instruction {
    Instruction::new(InstructionKind::PushStr(value.into()), line)
}

pub fn push_true(line: usize) -> Instruction {
    Instruction::new(InstructionKind::PushTrue, line)
}

pub fn push_false(line: usize) -> Instruction {
    Instruction::new(InstructionKind::PushFalse, line)
}

pub fn push_nil(line: usize) -> Instruction {
    Instruction::new(InstructionKind::PushNil, line)
}

pub fn push_self(line: usize) -> Instruction {
    Instruction::new(InstructionKind::PushSelf, line)
}

pub fn push_const(
    name: impl Into<String>,
    line: usize,
) -> Instruction {
    Instruction::new(InstructionKind::PushConst(name.into()), line)
}

pub fn set_var(
    name: impl Into<String>,
    line: usize,
) -> Instruction {
    Instruction::new(
        InstructionKind::SetVar {
            name: name.into(),
            annotation: None,
        },
        line,
    )
}

/// 带类型标注的赋值
pub fn set_var_annotated(
    name: impl Into<String>,
    annotation: TypeAnnotation,
    line: usize,
) -> Instruction {
    Instruction::new(
        InstructionKind::SetVar {
            name: name.into(),
            annotation: Some(annotation),
        },
        line,
    )
}

pub fn push_var(
    name: impl Into<String>,
    line: usize,
) -> Instruction {
    Instruction::new(InstructionKind::PushVar(name.into()), line)
}

pub fn push_arg(
    index: usize,
    line: usize,
) -> Instruction {
    Instruction::new(InstructionKind::PushArg(index), line)
}

/// 参数均无标注的方法定义
pub fn def(
    name: impl Into<String>,
    params: &[&str],
    body: Vec<Instruction>,
    line: usize,
) -> Instruction {
    def_with_params(name, params.iter().map(|p| Param::new(*p)).collect(), body, line)
}

pub fn def_with_params(
    name: impl Into<String>,
    params: Vec<Param>,
    body: Vec<Instruction>,
    line: usize,
) -> Instruction {
    Instruction::new(
        InstructionKind::Def {
            name: name.into(),
            params,
            body,
        },
        line,
    )
}

/// 以 self 为接收者的调用
pub fn call(
    name: impl Into<String>,
    arg_count: usize,
    line: usize,
) -> Instruction {
    Instruction::new(
        InstructionKind::Call {
            name: name.into(),
            arg_count,
            has_receiver: false,
        },
        line,
    )
}

/// 接收者在参数之前压栈的调用
pub fn send(
    name: impl Into<String>,
    arg_count: usize,
    line: usize,
) -> Instruction {
    Instruction::new(
        InstructionKind::Call {
            name: name.into(),
            arg_count,
            has_receiver: true,
        },
        line,
    )
}

pub fn if_else(
    if_true: Vec<Instruction>,
    if_false: Vec<Instruction>,
    line: usize,
) -> Instruction {
    Instruction::new(
        InstructionKind::If {
            if_true,
            if_false,
            used: true,
        },
        line,
    )
}

/// 值不被使用的条件语句
pub fn if_statement(
    if_true: Vec<Instruction>,
    if_false: Vec<Instruction>,
    line: usize,
) -> Instruction {
    Instruction::new(
        InstructionKind::If {
            if_true,
            if_false,
            used: false,
        },
        line,
    )
}

pub fn while_loop(
    condition: Vec<Instruction>,
    body: Vec<Instruction>,
    line: usize,
) -> Instruction {
    Instruction::new(InstructionKind::While { condition, body }, line)
}

pub fn push_array(
    size: usize,
    line: usize,
) -> Instruction {
    Instruction::new(InstructionKind::PushArray(size), line)
}

pub fn class(
    name: impl Into<String>,
    superclass: Option<&str>,
    body: Vec<Instruction>,
    line: usize,
) -> Instruction {
    Instruction::new(
        InstructionKind::Class {
            name: name.into(),
            superclass: superclass.map(str::to_string),
            body,
            ivars: Vec::new(),
        },
        line,
    )
}

pub fn set_ivar(
    name: impl Into<String>,
    line: usize,
) -> Instruction {
    Instruction::new(
        InstructionKind::SetIvar {
            name: name.into(),
            annotation: None,
        },
        line,
    )
}

pub fn set_ivar_annotated(
    name: impl Into<String>,
    annotation: TypeAnnotation,
    line: usize,
) -> Instruction {
    Instruction::new(
        InstructionKind::SetIvar {
            name: name.into(),
            annotation: Some(annotation),
        },
        line,
    )
}

pub fn push_ivar(
    name: impl Into<String>,
    line: usize,
) -> Instruction {
    Instruction::new(InstructionKind::PushIvar(name.into()), line)
}

pub fn pop(line: usize) -> Instruction {
    Instruction::new(InstructionKind::Pop, line)
}
