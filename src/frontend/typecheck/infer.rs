//! 推断驱动
//!
//! 按运行时的执行顺序线性遍历指令树，为每条指令写入类型：
//! - 值类型栈与运行时操作数栈的压栈 / 出栈一一对应
//! - 作用域栈记录 self 类型、当前方法的参数类型
//! - 接收者类型未知的调用进入延迟队列，遍历结束后第二遍解析

use super::builtins::{self, meta_owner, OBJECT};
use super::classes::ClassRegistry;
use super::deferred::PendingCall;
use super::env::{EnvKey, TypeEnvironment};
use super::errors::{ClashContext, TypeError, TypeResult};
use super::TypedProgram;
use crate::frontend::core::type_system::{MonoType, TypeSolver, TypeVar, UnifyError, VarOrigin};
use crate::frontend::ir::{Instruction, InstructionKind, Param, TypeAnnotation, TypeSlot};
use crate::util::config::CheckerConfig;
use std::collections::HashSet;
use tracing::{debug, trace};

/// 词法作用域
#[derive(Debug, Clone)]
struct Scope {
    self_type: MonoType,
    /// 当前方法的参数类型（`push_arg` 按下标读取）
    params: Vec<MonoType>,
    /// 所在方法名；顶层和类体中为 None
    method: Option<String>,
}

/// 方法查找结果
#[derive(Debug, Clone)]
pub(super) struct FoundMethod {
    pub ty: MonoType,
    /// 依赖接收者元素类型的内置方法，不需要实例化
    pub parametric: bool,
}

/// 类型推断器
pub struct TypeInferrer {
    pub(super) solver: TypeSolver,
    pub(super) env: TypeEnvironment,
    pub(super) classes: ClassRegistry,
    pub(super) deferred: Vec<PendingCall>,
    pub(super) config: CheckerConfig,
    stack: Vec<MonoType>,
    /// 当前指令体在栈上的起始深度
    floor: usize,
    scopes: Vec<Scope>,
    /// 被泛化过的类型变量
    generalized: HashSet<TypeVar>,
}

impl Default for TypeInferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInferrer {
    pub fn new() -> Self {
        Self::with_config(CheckerConfig::default())
    }

    pub fn with_config(config: CheckerConfig) -> Self {
        let mut inferrer = TypeInferrer {
            solver: TypeSolver::new(),
            env: TypeEnvironment::new(),
            classes: ClassRegistry::new(),
            deferred: Vec::new(),
            config,
            stack: Vec::new(),
            floor: 0,
            scopes: vec![Scope {
                self_type: MonoType::class(OBJECT),
                params: Vec::new(),
                method: None,
            }],
            generalized: HashSet::new(),
        };
        builtins::install(&mut inferrer.env);
        inferrer.install_new(OBJECT, None);
        inferrer
    }

    /// 推断整个程序
    pub fn check(
        mut self,
        mut instructions: Vec<Instruction>,
    ) -> TypeResult<TypedProgram> {
        debug!("type checking {} top-level instructions", instructions.len());
        let result = self.analyze_body(&mut instructions)?;

        self.resolve_deferred()?;

        debug!("finalizing instruction types");
        self.finalize(&mut instructions, &HashSet::new())?;
        let result_type = self.solver.prune(&result);

        let mut classes = self.classes.clone();
        for ty in classes.ivar_types_mut() {
            *ty = self.solver.prune(ty);
        }

        Ok(TypedProgram {
            instructions,
            classes,
            result_type,
        })
    }

    fn scope(&self) -> &Scope {
        // 顶层作用域在构造时压入且从不弹出
        &self.scopes[self.scopes.len() - 1]
    }

    fn in_method(&self) -> bool {
        self.scope().method.is_some()
    }

    fn push(
        &mut self,
        ty: MonoType,
    ) -> TypeSlot {
        self.stack.push(ty.clone());
        TypeSlot::Known(ty)
    }

    fn pop(
        &mut self,
        line: usize,
    ) -> TypeResult<MonoType> {
        if self.stack.len() <= self.floor {
            return Err(TypeError::malformed("stack underflow", Some(line)));
        }
        self.stack
            .pop()
            .ok_or_else(|| TypeError::malformed("stack underflow", Some(line)))
    }

    /// 弹出 n 个值，按压栈顺序返回
    fn pop_many(
        &mut self,
        count: usize,
        line: usize,
    ) -> TypeResult<Vec<MonoType>> {
        if self.stack.len() < self.floor + count {
            return Err(TypeError::malformed(
                format!("stack underflow: expected {} values", count),
                Some(line),
            ));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    /// 分析一个指令体，返回它最后压入的值的类型（没有则为 Nil），并恢复栈深度
    pub(super) fn analyze_body(
        &mut self,
        body: &mut [Instruction],
    ) -> TypeResult<MonoType> {
        let depth = self.stack.len();
        let outer_floor = std::mem::replace(&mut self.floor, depth);
        let walked = body.iter_mut().try_for_each(|i| self.analyze(i));
        self.floor = outer_floor;
        walked?;

        let ty = if self.stack.len() > depth {
            self.stack[self.stack.len() - 1].clone()
        } else {
            MonoType::Nil
        };
        self.stack.truncate(depth);
        Ok(ty)
    }

    fn analyze(
        &mut self,
        instruction: &mut Instruction,
    ) -> TypeResult<()> {
        let line = instruction.line;
        trace!(instruction = instruction.kind.name(), line, "analyze");

        let slot = match &mut instruction.kind {
            InstructionKind::PushInt(_) => self.push(MonoType::Integer),
            InstructionKind::PushStr(_) => self.push(MonoType::String),
            InstructionKind::PushTrue | InstructionKind::PushFalse => self.push(MonoType::Boolean),
            InstructionKind::PushNil => self.push(MonoType::Nil),
            InstructionKind::PushSelf => {
                let ty = self.scope().self_type.clone();
                self.push(ty)
            }
            InstructionKind::PushConst(name) => self.analyze_push_const(name, line)?,
            InstructionKind::SetVar { name, annotation } => {
                self.analyze_set_var(name, annotation.as_ref(), line)?
            }
            InstructionKind::PushVar(name) => self.analyze_push_var(name, line)?,
            InstructionKind::PushArg(index) => self.analyze_push_arg(*index, line)?,
            InstructionKind::Def { name, params, body } => {
                self.analyze_def(name, params, body, line)?
            }
            InstructionKind::Call {
                name,
                arg_count,
                has_receiver,
            } => self.analyze_call(name, *arg_count, *has_receiver, line)?,
            InstructionKind::If {
                if_true,
                if_false,
                used,
            } => self.analyze_if(if_true, if_false, *used, line)?,
            InstructionKind::While { condition, body } => {
                self.analyze_while(condition, body, line)?
            }
            InstructionKind::PushArray(size) => self.analyze_push_array(*size, line)?,
            InstructionKind::Class {
                name,
                superclass,
                body,
                ..
            } => self.analyze_class(name, superclass.as_deref(), body, line)?,
            InstructionKind::SetIvar { name, annotation } => {
                self.analyze_set_ivar(name, annotation.as_ref(), line)?
            }
            InstructionKind::PushIvar(name) => self.analyze_push_ivar(name, line)?,
            InstructionKind::Pop => {
                self.pop(line)?;
                TypeSlot::Known(MonoType::Nil)
            }
        };

        instruction.slot = slot;
        Ok(())
    }

    fn analyze_push_const(
        &mut self,
        name: &str,
        line: usize,
    ) -> TypeResult<TypeSlot> {
        if !self.classes.contains(name) {
            return Err(TypeError::undefined(
                name,
                format!("undefined constant {}", name),
                Some(line),
            ));
        }
        Ok(self.push(MonoType::meta(name)))
    }

    fn analyze_set_var(
        &mut self,
        name: &str,
        annotation: Option<&TypeAnnotation>,
        line: usize,
    ) -> TypeResult<TypeSlot> {
        let value = self.pop(line)?;
        let value = self.constrain(annotation, value, line)?;

        let key = EnvKey::local(name);
        let ty = match self.env.get(&key).cloned() {
            Some(existing) => {
                let context = ClashContext::Reassignment {
                    name: name.to_string(),
                };
                self.unify_in(&existing, &value, context, line)?;
                existing
            }
            None => {
                let ty = self.promote_nil(&value);
                self.env.insert(key, ty.clone());
                ty
            }
        };
        // 局部变量是单态的：之后的每次读取共享同一组变量
        self.make_monomorphic(&ty);
        Ok(TypeSlot::Known(ty))
    }

    fn analyze_push_var(
        &mut self,
        name: &str,
        line: usize,
    ) -> TypeResult<TypeSlot> {
        let ty = self
            .env
            .retrieve(&mut self.solver, &EnvKey::local(name))
            .ok_or_else(|| {
                TypeError::undefined(
                    name,
                    format!("undefined local variable `{}`", name),
                    Some(line),
                )
            })?;
        Ok(self.push(ty))
    }

    fn analyze_push_arg(
        &mut self,
        index: usize,
        line: usize,
    ) -> TypeResult<TypeSlot> {
        let param = self.scope().params.get(index).cloned().ok_or_else(|| {
            TypeError::undefined(
                format!("arg{}", index),
                format!("undefined argument {}", index),
                Some(line),
            )
        })?;
        let ty = self.solver.instantiate(&param);
        Ok(self.push(ty))
    }

    fn analyze_def(
        &mut self,
        name: &str,
        params: &[Param],
        body: &mut [Instruction],
        line: usize,
    ) -> TypeResult<TypeSlot> {
        let self_type = self.scope().self_type.clone();
        let owner = self_type
            .owner_name()
            .unwrap_or_else(|| OBJECT.to_string());
        let key = EnvKey::method(owner, name);
        debug!(method = %key, line, "analyzing method definition");

        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            let ty = match &param.annotation {
                Some(annotation) => self.resolve_annotation(annotation, line)?,
                None => self.solver.new_var_with_origin(
                    false,
                    VarOrigin::MethodParameter {
                        method: name.to_string(),
                        param: param.name.clone(),
                        line,
                    },
                ),
            };
            param_types.push(ty);
        }

        // 递归调用先与占位符统一；参数个数已知，只有返回类型待定
        let return_placeholder = self.solver.new_var_with_origin(
            false,
            VarOrigin::RecursivePlaceholder {
                method: name.to_string(),
                line,
            },
        );
        let placeholder = MonoType::func(param_types.clone(), return_placeholder);
        self.env.insert(key.clone(), placeholder.clone());

        let mut body_env = self.env.without_locals();
        for (param, ty) in params.iter().zip(&param_types) {
            body_env.insert(EnvKey::local(param.name.as_str()), ty.clone());
        }
        let outer_env = std::mem::replace(&mut self.env, body_env);
        self.scopes.push(Scope {
            self_type: self_type.clone(),
            params: param_types.clone(),
            method: Some(name.to_string()),
        });
        let body_type = self.analyze_body(body);
        self.scopes.pop();
        self.env = outer_env;
        let body_type = body_type?;

        let fn_type = MonoType::func(param_types, body_type);
        self.unify_in(&placeholder, &fn_type, ClashContext::Plain, line)?;

        let pinned = self.pinned_vars(&key);
        let scheme = self.solver.generalize(&fn_type, &pinned);
        for var in self.solver.free_vars(&scheme) {
            if !pinned.contains(&var) {
                self.generalized.insert(var);
            }
        }
        trace!(method = %key, scheme = %scheme, "generalized");
        self.env.insert(key, scheme.clone());

        if name == "initialize" {
            if let (MonoType::Class(class), Some((params, _))) = (&self_type, scheme.as_fn()) {
                let new = MonoType::func(params.to_vec(), MonoType::class(class.as_str()));
                self.env.insert(EnvKey::method(meta_owner(class), "new"), new);
            }
        }

        Ok(TypeSlot::Known(scheme))
    }

    /// 泛化时必须保持单态的变量：仍被其他环境条目、实例变量、
    /// 未完成的延迟调用或外层方法参数引用的非泛型变量
    fn pinned_vars(
        &mut self,
        key: &EnvKey,
    ) -> HashSet<TypeVar> {
        let mut sources: Vec<MonoType> = self
            .env
            .iter()
            .filter(|(k, _)| *k != key)
            .map(|(_, ty)| ty.clone())
            .collect();
        sources.extend(self.classes.ivar_types().cloned());
        for call in &self.deferred {
            sources.push(call.receiver.clone());
            sources.push(call.synthesized.clone());
        }
        for scope in &self.scopes {
            sources.extend(scope.params.iter().cloned());
        }

        let mut pinned = HashSet::new();
        for ty in &sources {
            pinned.extend(self.solver.non_generic_vars(ty));
        }
        pinned
    }

    fn analyze_call(
        &mut self,
        name: &str,
        arg_count: usize,
        has_receiver: bool,
        line: usize,
    ) -> TypeResult<TypeSlot> {
        let args = self.pop_many(arg_count, line)?;
        let receiver = if has_receiver {
            self.pop(line)?
        } else {
            self.scope().self_type.clone()
        };
        let receiver = self.solver.prune(&receiver);

        if receiver.is_var() {
            return Ok(self.defer(receiver, name, args, line));
        }

        match self.find_method(&receiver, name, &self.env) {
            Some(found) => {
                let callee = self.instantiate_found(found);
                let result = self.apply_call(&receiver, name, callee, args, line)?;
                Ok(self.push(result))
            }
            // 方法可能在程序后面才定义
            None if self.in_method() => Ok(self.defer(receiver, name, args, line)),
            None => Err(self.undefined_method(&receiver, name, line)),
        }
    }

    fn apply_call(
        &mut self,
        receiver: &MonoType,
        name: &str,
        callee: MonoType,
        args: Vec<MonoType>,
        line: usize,
    ) -> TypeResult<MonoType> {
        let callee = self.solver.prune(&callee);
        let result = self.solver.new_var();

        match &callee {
            MonoType::Fn {
                params,
                return_type,
            } => {
                if params.len() != args.len() {
                    return Err(TypeError::ArgumentCount {
                        method: name.to_string(),
                        expected: params.len(),
                        found: args.len(),
                        line: Some(line),
                    });
                }
                let owner = self.solver.describe(receiver);
                for (index, (param, arg)) in params.iter().zip(&args).enumerate() {
                    let context = ClashContext::MethodArgument {
                        owner: owner.clone(),
                        method: name.to_string(),
                        index: index + 1,
                    };
                    self.unify_in(param, arg, context, line)?;
                }
                self.unify_in(&result, return_type, ClashContext::Plain, line)?;
            }
            // 方法类型尚未确定：用调用点的形状约束它
            _ => {
                let shape = MonoType::func(args, result.clone());
                self.unify_in(&callee, &shape, ClashContext::Plain, line)?;
            }
        }
        Ok(result)
    }

    fn defer(
        &mut self,
        receiver: MonoType,
        name: &str,
        args: Vec<MonoType>,
        line: usize,
    ) -> TypeSlot {
        let result = self.solver.new_var_with_origin(
            false,
            VarOrigin::CallResult {
                method: name.to_string(),
                line,
            },
        );
        let arg_count = args.len();
        let synthesized = MonoType::func(args, result.clone());
        self.make_monomorphic(&synthesized);
        self.make_monomorphic(&receiver);
        debug!(method = name, line, "deferring call until receiver is known");

        self.deferred.push(PendingCall {
            receiver,
            method: name.to_string(),
            synthesized,
            arg_count,
            line,
            env: self.env.clone(),
        });
        self.stack.push(result.clone());
        TypeSlot::Pending(result)
    }

    fn analyze_if(
        &mut self,
        if_true: &mut [Instruction],
        if_false: &mut [Instruction],
        used: bool,
        line: usize,
    ) -> TypeResult<TypeSlot> {
        let predicate = self.pop(line)?;
        self.check_condition(&predicate, ClashContext::IfCondition, line)?;

        let true_type = self.analyze_body(if_true)?;
        let false_type = self.analyze_body(if_false)?;
        if !used {
            return Ok(self.push(MonoType::Nil));
        }
        self.unify_in(&true_type, &false_type, ClashContext::IfBranches, line)?;
        Ok(self.push(true_type))
    }

    fn analyze_while(
        &mut self,
        condition: &mut [Instruction],
        body: &mut [Instruction],
        line: usize,
    ) -> TypeResult<TypeSlot> {
        let condition_type = self.analyze_body(condition)?;
        self.check_condition(&condition_type, ClashContext::WhileCondition, line)?;
        self.analyze_body(body)?;
        Ok(self.push(MonoType::Nil))
    }

    /// 条件必须是 Boolean；Nillable 作为真值测试也被接受
    fn check_condition(
        &mut self,
        condition: &MonoType,
        context: ClashContext,
        line: usize,
    ) -> TypeResult<()> {
        if let MonoType::Nillable(_) = self.solver.prune(condition) {
            return Ok(());
        }
        self.unify_in(&MonoType::Boolean, condition, context, line)
    }

    fn analyze_push_array(
        &mut self,
        size: usize,
        line: usize,
    ) -> TypeResult<TypeSlot> {
        let elements = self.pop_many(size, line)?;
        let has_nil = elements
            .iter()
            .any(|e| self.solver.prune(e) == MonoType::Nil);
        let elements: Vec<MonoType> = if has_nil {
            elements.iter().map(|e| self.promote_element(e)).collect()
        } else {
            elements
        };

        for pair in elements.windows(2) {
            self.unify_in(&pair[0], &pair[1], ClashContext::ArrayElement, line)?;
        }

        let element = match elements.first() {
            Some(first) => first.clone(),
            None => self
                .solver
                .new_var_with_origin(false, VarOrigin::ArrayElement { line }),
        };
        self.make_monomorphic(&element);
        Ok(self.push(MonoType::array(element)))
    }

    /// 含 nil 的数组中：nil → Nillable(新变量)，普通值 → Nillable(值)
    fn promote_element(
        &mut self,
        element: &MonoType,
    ) -> MonoType {
        match self.solver.prune(element) {
            MonoType::Nil => MonoType::nillable(self.solver.new_non_generic_var()),
            nillable @ MonoType::Nillable(_) => nillable,
            other => MonoType::nillable(other),
        }
    }

    fn analyze_class(
        &mut self,
        name: &str,
        superclass: Option<&str>,
        body: &mut [Instruction],
        line: usize,
    ) -> TypeResult<TypeSlot> {
        if let Some(superclass) = superclass {
            if !self.classes.contains(superclass) {
                return Err(TypeError::undefined(
                    superclass,
                    format!("undefined constant {}", superclass),
                    Some(line),
                ));
            }
        }

        let reopened = self.classes.contains(name);
        self.classes.register(name, superclass);
        if !reopened {
            self.install_new(name, superclass);
        }
        debug!(class = name, line, "analyzing class body");

        self.scopes.push(Scope {
            self_type: MonoType::class(name),
            params: Vec::new(),
            method: None,
        });
        let walked = self.analyze_body(body);
        self.scopes.pop();
        walked?;

        Ok(TypeSlot::Known(MonoType::class(name)))
    }

    /// 在类对象上安装 `new`，参数继承自父类的 `new`
    fn install_new(
        &mut self,
        class: &str,
        superclass: Option<&str>,
    ) {
        let params = superclass
            .and_then(|s| self.env.get(&EnvKey::method(meta_owner(s), "new")))
            .and_then(|ty| ty.as_fn().map(|(params, _)| params.to_vec()))
            .unwrap_or_default();
        self.env.insert(
            EnvKey::method(meta_owner(class), "new"),
            MonoType::func(params, MonoType::class(class)),
        );
    }

    fn current_class(
        &self,
        ivar: &str,
        line: usize,
    ) -> TypeResult<String> {
        match &self.scope().self_type {
            MonoType::Class(name) => Ok(name.clone()),
            other => Err(TypeError::undefined(
                ivar,
                format!("instance variable {} used outside a class ({})", ivar, other),
                Some(line),
            )),
        }
    }

    fn analyze_push_ivar(
        &mut self,
        name: &str,
        line: usize,
    ) -> TypeResult<TypeSlot> {
        let class = self.current_class(name, line)?;
        let ty = self
            .classes
            .ivar_type(&class, name)
            .cloned()
            .ok_or_else(|| {
                TypeError::undefined(
                    name,
                    format!("undefined instance variable {} for {}", name, class),
                    Some(line),
                )
            })?;
        let ty = self.solver.instantiate(&ty);
        Ok(self.push(ty))
    }

    fn analyze_set_ivar(
        &mut self,
        name: &str,
        annotation: Option<&TypeAnnotation>,
        line: usize,
    ) -> TypeResult<TypeSlot> {
        let value = self.pop(line)?;
        let value = self.constrain(annotation, value, line)?;
        let class = self.current_class(name, line)?;

        let ty = match self.classes.ivar_type(&class, name).cloned() {
            Some(existing) => {
                let context = ClashContext::Reassignment {
                    name: name.to_string(),
                };
                self.unify_in(&existing, &value, context, line)?;
                existing
            }
            None => {
                let ty = self.promote_nil(&value);
                self.classes.declare_ivar(&class, name, ty.clone());
                ty
            }
        };
        self.make_monomorphic(&ty);
        // 运行时只查看栈顶而不弹出
        Ok(self.push(ty))
    }

    /// 标注立即约束赋值的类型；结果为标注的类型
    fn constrain(
        &mut self,
        annotation: Option<&TypeAnnotation>,
        value: MonoType,
        line: usize,
    ) -> TypeResult<MonoType> {
        let Some(annotation) = annotation else {
            return Ok(value);
        };
        let declared = self.resolve_annotation(annotation, line)?;
        self.unify_in(&declared, &value, ClashContext::Annotation, line)?;
        Ok(declared)
    }

    /// 单独的 nil 不足以确定类型：变为 Nillable(占位变量)
    fn promote_nil(
        &mut self,
        value: &MonoType,
    ) -> MonoType {
        match self.solver.prune(value) {
            MonoType::Nil => MonoType::nillable(self.solver.new_non_generic_var()),
            _ => value.clone(),
        }
    }

    fn make_monomorphic(
        &mut self,
        ty: &MonoType,
    ) {
        let resolved = self.solver.prune(ty);
        self.solver.mark_non_generic(&resolved);
    }

    /// 把类型标注解析为类型
    pub(super) fn resolve_annotation(
        &mut self,
        annotation: &TypeAnnotation,
        line: usize,
    ) -> TypeResult<MonoType> {
        let ty = match (annotation.name.as_str(), annotation.args.as_slice()) {
            ("Integer" | "Int", []) => MonoType::Integer,
            ("String" | "Str", []) => MonoType::String,
            ("Boolean" | "Bool", []) => MonoType::Boolean,
            ("Nil" | "NilClass", []) => MonoType::Nil,
            ("Option" | "Nillable", [inner]) => {
                let inner = self.resolve_annotation(inner, line)?;
                if inner.is_native() {
                    return Err(TypeError::not_enough_information(
                        format!(
                            "Option[{}] is not supported since {} is a native type (line {})",
                            inner, inner, line
                        ),
                        Some(line),
                    ));
                }
                MonoType::nillable(inner)
            }
            ("Array", [element]) => MonoType::array(self.resolve_annotation(element, line)?),
            (name, []) if self.classes.contains(name) => MonoType::class(name),
            _ => {
                return Err(TypeError::undefined(
                    annotation.name.as_str(),
                    format!("undefined type {} (line {})", annotation, line),
                    Some(line),
                ))
            }
        };
        Ok(ty)
    }

    /// 统一并按上下文组合报错信息
    pub(super) fn unify_in(
        &mut self,
        expected: &MonoType,
        found: &MonoType,
        context: ClashContext,
        line: usize,
    ) -> TypeResult<()> {
        match self.solver.unify(expected, found) {
            Ok(()) => Ok(()),
            Err(UnifyError::Recursive { var, ty }) => {
                let message = format!(
                    "recursive unification: {} contains {}",
                    self.solver.describe(&ty),
                    self.solver.describe(&var)
                );
                Err(TypeError::RecursiveUnification {
                    message,
                    line: Some(line),
                })
            }
            Err(UnifyError::Clash { .. }) => {
                let expected = self.solver.describe(expected);
                let found = self.solver.describe(found);
                Err(TypeError::TypeClash {
                    message: context.message(&expected, &found, Some(line)),
                    line: Some(line),
                })
            }
        }
    }

    /// 沿接收者的查找链查找方法
    pub(super) fn find_method(
        &self,
        receiver: &MonoType,
        name: &str,
        env: &TypeEnvironment,
    ) -> Option<FoundMethod> {
        if let Some(ty) = builtins::parametric_method(receiver, name) {
            return Some(FoundMethod {
                ty,
                parametric: true,
            });
        }
        self.method_owners(receiver)
            .into_iter()
            .find_map(|owner| env.get(&EnvKey::method(owner, name)).cloned())
            .map(|ty| FoundMethod {
                ty,
                parametric: false,
            })
    }

    fn method_owners(
        &self,
        receiver: &MonoType,
    ) -> Vec<String> {
        match receiver {
            MonoType::Class(name) => self.classes.ancestors(name),
            MonoType::Meta(name) => self
                .classes
                .ancestors(name)
                .iter()
                .map(|class| meta_owner(class))
                .collect(),
            MonoType::Integer | MonoType::String | MonoType::Boolean | MonoType::Nil => {
                vec![receiver.type_name(), OBJECT.to_string()]
            }
            MonoType::Array(_) | MonoType::Nillable(_) => vec![OBJECT.to_string()],
            _ => Vec::new(),
        }
    }

    pub(super) fn instantiate_found(
        &mut self,
        found: FoundMethod,
    ) -> MonoType {
        if found.parametric {
            found.ty
        } else {
            self.solver.instantiate(&found.ty)
        }
    }

    pub(super) fn undefined_method(
        &mut self,
        receiver: &MonoType,
        name: &str,
        line: usize,
    ) -> TypeError {
        let receiver = self.solver.describe(receiver);
        TypeError::undefined(
            name,
            format!("undefined method `{}` for {} (line {})", name, receiver, line),
            Some(line),
        )
    }

    /// 变量无法确定时的报错，优先指出它来自哪个方法参数
    pub(super) fn not_enough_information(
        &mut self,
        var: TypeVar,
        fallback: String,
        line: usize,
    ) -> TypeError {
        let (message, line) = match self.solver.find_origin(var) {
            Some(VarOrigin::MethodParameter {
                method,
                param,
                line,
            }) => (
                format!(
                    "Not enough information to infer type of parameter `{}` for method `{}` (line {})",
                    param, method, line
                ),
                line,
            ),
            Some(VarOrigin::RecursivePlaceholder { method, line }) => (
                format!(
                    "Not enough information to infer return type of method `{}` (line {})",
                    method, line
                ),
                line,
            ),
            Some(VarOrigin::CallResult { method, line }) => (
                format!(
                    "Not enough information to infer result type of `{}` (line {})",
                    method, line
                ),
                line,
            ),
            Some(VarOrigin::ArrayElement { line }) => (
                format!(
                    "Not enough information to infer element type of array (line {})",
                    line
                ),
                line,
            ),
            None => (fallback, line),
        };
        TypeError::not_enough_information(message, Some(line))
    }

    /// 最终化：每个槽替换为完全剪枝后的类型，并检查残留的类型变量
    ///
    /// `schemes` 是外层方法类型中被泛化的变量，只在该方法自身及其方法体内合法
    fn finalize(
        &mut self,
        instructions: &mut [Instruction],
        schemes: &HashSet<TypeVar>,
    ) -> TypeResult<()> {
        for instruction in instructions.iter_mut() {
            let line = instruction.line;
            let ty = match &instruction.slot {
                TypeSlot::Unset => {
                    return Err(TypeError::malformed(
                        format!("instruction `{}` was never typed", instruction.kind.name()),
                        Some(line),
                    ))
                }
                TypeSlot::Pending(ty) | TypeSlot::Known(ty) => ty.clone(),
            };
            let resolved = self.solver.prune(&ty);
            let free = self.solver.free_vars(&resolved);

            let mut scoped = schemes.clone();
            if let InstructionKind::Def { .. } = instruction.kind {
                scoped.extend(free.iter().copied().filter(|v| self.generalized.contains(v)));
            }

            if self.config.strict {
                let residual = free.into_iter().find(|v| !scoped.contains(v));
                if let Some(var) = residual {
                    let fallback = format!(
                        "Not enough information to infer type of instruction `{}` (line {})",
                        instruction.kind.name(),
                        line
                    );
                    return Err(self.not_enough_information(var, fallback, line));
                }
            }
            instruction.slot = TypeSlot::Known(resolved);

            match &mut instruction.kind {
                InstructionKind::Def { body, .. } => self.finalize(body, &scoped)?,
                InstructionKind::If {
                    if_true, if_false, ..
                } => {
                    self.finalize(if_true, &scoped)?;
                    self.finalize(if_false, &scoped)?;
                }
                InstructionKind::While { condition, body } => {
                    self.finalize(condition, &scoped)?;
                    self.finalize(body, &scoped)?;
                }
                InstructionKind::Class {
                    name, body, ivars, ..
                } => {
                    self.finalize(body, &scoped)?;
                    *ivars = self
                        .classes
                        .all_ivars(name)
                        .into_iter()
                        .map(|(ivar, ty)| (ivar, self.solver.prune(&ty)))
                        .collect();
                }
                _ => {}
            }
        }
        Ok(())
    }
}
