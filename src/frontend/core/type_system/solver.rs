//! 类型求解器
//!
//! 实现类型系统的核心算法：
//! - 剪枝（prune）：沿绑定链解析类型变量，并缓存结果
//! - 出现检查（occurs check）：禁止无限类型
//! - 统一（unify）：含 Union / Nillable 的特殊兼容规则
//! - 实例化 / 泛化：let 多态

use super::error::{UnifyError, UnifyResult};
use super::mono::MonoType;
use super::var::{successor, TypeBinding, TypeVar, VarCell, VarOrigin};
use std::collections::{HashMap, HashSet};

/// 类型求解器
///
/// 所有类型变量的绑定单元都存放在 `cells` 中，以 `TypeVar` 索引访问
#[derive(Debug, Clone, Default)]
pub struct TypeSolver {
    /// 类型变量的绑定单元
    cells: Vec<VarCell>,
    /// 最近一次分配的可读变量名
    last_name: Option<String>,
}

impl TypeSolver {
    /// 创建新的求解器
    pub fn new() -> Self {
        Self::default()
    }

    /// 已创建的类型变量数量
    pub fn var_count(&self) -> usize {
        self.cells.len()
    }

    /// 创建新的（泛型）类型变量
    pub fn new_var(&mut self) -> MonoType {
        self.alloc(VarCell::new(true))
    }

    /// 创建新的非泛型类型变量
    pub fn new_non_generic_var(&mut self) -> MonoType {
        self.alloc(VarCell::new(false))
    }

    /// 创建带来源信息的类型变量
    pub fn new_var_with_origin(
        &mut self,
        generic: bool,
        origin: VarOrigin,
    ) -> MonoType {
        let mut cell = VarCell::new(generic);
        cell.origin = Some(origin);
        self.alloc(cell)
    }

    fn alloc(
        &mut self,
        cell: VarCell,
    ) -> MonoType {
        let var = TypeVar::new(self.cells.len());
        self.cells.push(cell);
        MonoType::TypeVar(var)
    }

    /// 获取绑定单元
    pub fn cell(
        &self,
        var: TypeVar,
    ) -> &VarCell {
        &self.cells[var.index()]
    }

    pub fn is_generic(
        &self,
        var: TypeVar,
    ) -> bool {
        self.cells[var.index()].generic
    }

    pub fn origin(
        &self,
        var: TypeVar,
    ) -> Option<&VarOrigin> {
        self.cells[var.index()].origin.as_ref()
    }

    /// 查找变量的来源；变量本身没有来源时，寻找最终解析为它的带来源变量（优先方法参数）
    pub fn find_origin(
        &mut self,
        var: TypeVar,
    ) -> Option<VarOrigin> {
        let mut fallback = self.origin(var).cloned();
        if matches!(fallback, Some(VarOrigin::MethodParameter { .. })) {
            return fallback;
        }
        let target = MonoType::TypeVar(var);
        for index in 0..self.cells.len() {
            let Some(origin) = self.cells[index].origin.clone() else {
                continue;
            };
            if self.prune(&MonoType::TypeVar(TypeVar::new(index))) != target {
                continue;
            }
            if matches!(origin, VarOrigin::MethodParameter { .. }) {
                return Some(origin);
            }
            fallback.get_or_insert(origin);
        }
        fallback
    }

    /// 剪枝
    ///
    /// 对已绑定的变量递归解析其 instance 并缓存结果；非泛型变量的标记
    /// 传播到它解析成的类型上。对算子返回参数逐个剪枝后的新值（不与原值共享）。
    pub fn prune(
        &mut self,
        ty: &MonoType,
    ) -> MonoType {
        match ty {
            MonoType::TypeVar(var) => {
                let instance = match &self.cells[var.index()].binding {
                    TypeBinding::Unbound => return ty.clone(),
                    TypeBinding::Bound(instance) => instance.clone(),
                };
                let pruned = self.prune(&instance);
                if !self.cells[var.index()].generic {
                    self.mark_non_generic(&pruned);
                }
                self.cells[var.index()].binding = TypeBinding::Bound(pruned.clone());
                pruned
            }
            // 算子也要递归剪枝：嵌套在复合类型中的变量链否则无法正确解析
            op => {
                let args = op.type_args().into_iter().map(|t| self.prune(t)).collect();
                op.with_args(args)
            }
        }
    }

    /// 完全解析类型（与 prune 等价，语义上用于输出阶段）
    pub fn resolve(
        &mut self,
        ty: &MonoType,
    ) -> MonoType {
        self.prune(ty)
    }

    /// 出现检查：`var` 是否出现在 `ty` 中
    pub fn occurs_in(
        &mut self,
        var: TypeVar,
        ty: &MonoType,
    ) -> bool {
        let ty = self.prune(ty);
        contains_var(&ty, var)
    }

    /// 统一两个类型
    pub fn unify(
        &mut self,
        a: &MonoType,
        b: &MonoType,
    ) -> UnifyResult {
        let a = self.prune(a);
        let b = self.prune(b);

        match (&a, &b) {
            (MonoType::TypeVar(var), _) => self.bind(*var, &b),
            // 统一满足交换律
            (_, MonoType::TypeVar(_)) => self.unify(&b, &a),

            (MonoType::Union(_), MonoType::Union(_)) => self.unify_operators(&a, &b),
            (MonoType::Union(members), _) => self.unify_union_member(&a, members, &b),
            (_, MonoType::Union(_)) => self.unify(&b, &a),

            (MonoType::Nillable(inner), _) => self.unify_nillable(&a, inner, &b),
            (_, MonoType::Nillable(_)) => self.unify(&b, &a),

            _ => self.unify_operators(&a, &b),
        }
    }

    fn bind(
        &mut self,
        var: TypeVar,
        ty: &MonoType,
    ) -> UnifyResult {
        if let MonoType::TypeVar(other) = ty {
            if *other == var {
                return Ok(());
            }
        }
        if contains_var(ty, var) {
            return Err(UnifyError::Recursive {
                var: MonoType::TypeVar(var),
                ty: ty.clone(),
            });
        }
        self.cells[var.index()].binding = TypeBinding::Bound(ty.clone());
        Ok(())
    }

    /// 名称与参数个数都相同时逐个统一参数；内部冲突以外层类型重新报告
    fn unify_operators(
        &mut self,
        a: &MonoType,
        b: &MonoType,
    ) -> UnifyResult {
        if a.operator_name() != b.operator_name() || a.arity() != b.arity() {
            return Err(UnifyError::clash(a, b));
        }
        let pairs: Vec<(MonoType, MonoType)> = a
            .type_args()
            .into_iter()
            .cloned()
            .zip(b.type_args().into_iter().cloned())
            .collect();
        for (left, right) in pairs {
            match self.unify(&left, &right) {
                Ok(()) => {}
                Err(UnifyError::Clash { .. }) => return Err(UnifyError::clash(a, b)),
                Err(recursive) => return Err(recursive),
            }
        }
        Ok(())
    }

    /// Union 与具体类型：选取名称和参数个数都匹配的成员进行统一
    fn unify_union_member(
        &mut self,
        union: &MonoType,
        members: &[MonoType],
        other: &MonoType,
    ) -> UnifyResult {
        let name = other.operator_name();
        let member = members
            .iter()
            .find(|m| m.operator_name() == name && m.arity() == other.arity())
            .cloned();
        match member {
            Some(member) => self
                .unify(&member, other)
                .map_err(|e| outer_clash(e, union, other)),
            None => Err(UnifyError::clash(union, other)),
        }
    }

    /// Nillable 的兼容规则
    ///
    /// - 与 Nil：直接成功
    /// - 与 Nillable：统一内部类型
    /// - 与普通值：内部仍是未绑定变量时绑定为该值（延迟提升），否则内部类型须与之统一
    fn unify_nillable(
        &mut self,
        nillable: &MonoType,
        inner: &MonoType,
        other: &MonoType,
    ) -> UnifyResult {
        match other {
            MonoType::Nil => Ok(()),
            MonoType::Nillable(other_inner) => self
                .unify(inner, other_inner)
                .map_err(|e| outer_clash(e, nillable, other)),
            _ => self
                .unify(inner, other)
                .map_err(|e| outer_clash(e, nillable, other)),
        }
    }

    /// 实例化
    ///
    /// 泛型变量在本次实例化中被替换为同一个新变量；非泛型变量原样保留
    pub fn instantiate(
        &mut self,
        ty: &MonoType,
    ) -> MonoType {
        let mut mapping = HashMap::new();
        self.fresh(ty, &mut mapping)
    }

    fn fresh(
        &mut self,
        ty: &MonoType,
        mapping: &mut HashMap<TypeVar, MonoType>,
    ) -> MonoType {
        let ty = self.prune(ty);
        match &ty {
            MonoType::TypeVar(var) => {
                if !self.is_generic(*var) {
                    return ty;
                }
                if let Some(existing) = mapping.get(var) {
                    return existing.clone();
                }
                let fresh = self.new_var();
                mapping.insert(*var, fresh.clone());
                fresh
            }
            op => {
                let args = op
                    .type_args()
                    .into_iter()
                    .map(|t| self.fresh(t, mapping))
                    .collect();
                op.with_args(args)
            }
        }
    }

    /// 类型中所有未绑定变量（按首次出现顺序，去重）
    pub fn free_vars(
        &mut self,
        ty: &MonoType,
    ) -> Vec<TypeVar> {
        let ty = self.prune(ty);
        let mut vars = Vec::new();
        collect_vars(&ty, &mut vars);
        vars
    }

    /// 类型中未绑定的非泛型变量
    pub fn non_generic_vars(
        &mut self,
        ty: &MonoType,
    ) -> Vec<TypeVar> {
        self.free_vars(ty)
            .into_iter()
            .filter(|v| !self.is_generic(*v))
            .collect()
    }

    /// 将类型中的所有未绑定变量标记为非泛型
    pub fn mark_non_generic(
        &mut self,
        ty: &MonoType,
    ) {
        let mut vars = Vec::new();
        collect_vars(ty, &mut vars);
        for var in vars {
            if !self.cells[var.index()].is_bound() {
                self.cells[var.index()].generic = false;
            }
        }
    }

    /// 泛化
    ///
    /// `pinned` 中的变量保持非泛型（在同一作用域内共享），其余未绑定变量恢复为泛型
    pub fn generalize(
        &mut self,
        ty: &MonoType,
        pinned: &HashSet<TypeVar>,
    ) -> MonoType {
        let ty = self.prune(ty);
        for var in self.free_vars(&ty) {
            self.cells[var.index()].generic = !pinned.contains(&var);
        }
        ty
    }

    /// 可读的类型描述；类型变量按首次打印的顺序命名为 a, b, c ...
    pub fn describe(
        &mut self,
        ty: &MonoType,
    ) -> String {
        let ty = self.prune(ty);
        let mut names = HashMap::new();
        for var in self.free_vars(&ty) {
            names.insert(var, self.var_name(var));
        }
        render(&ty, &names)
    }

    /// 类型变量的可读名称（惰性分配）
    pub fn var_name(
        &mut self,
        var: TypeVar,
    ) -> String {
        if let Some(name) = &self.cells[var.index()].name {
            return name.clone();
        }
        let name = match &self.last_name {
            Some(last) => successor(last),
            None => "a".to_string(),
        };
        self.last_name = Some(name.clone());
        self.cells[var.index()].name = Some(name.clone());
        name
    }
}

fn outer_clash(
    error: UnifyError,
    left: &MonoType,
    right: &MonoType,
) -> UnifyError {
    match error {
        UnifyError::Clash { .. } => UnifyError::clash(left, right),
        recursive => recursive,
    }
}

/// 结构上检查变量是否出现（调用方负责先剪枝）
fn contains_var(
    ty: &MonoType,
    var: TypeVar,
) -> bool {
    match ty {
        MonoType::TypeVar(v) => *v == var,
        op => op.type_args().into_iter().any(|t| contains_var(t, var)),
    }
}

fn collect_vars(
    ty: &MonoType,
    out: &mut Vec<TypeVar>,
) {
    match ty {
        MonoType::TypeVar(v) => {
            if !out.contains(v) {
                out.push(*v);
            }
        }
        op => {
            for arg in op.type_args() {
                collect_vars(arg, out);
            }
        }
    }
}

fn render(
    ty: &MonoType,
    names: &HashMap<TypeVar, String>,
) -> String {
    match ty {
        MonoType::TypeVar(v) => names.get(v).cloned().unwrap_or_else(|| v.to_string()),
        MonoType::Fn {
            params,
            return_type,
        } => format!(
            "([{}] -> {})",
            params
                .iter()
                .map(|p| render(p, names))
                .collect::<Vec<_>>()
                .join(", "),
            render(return_type, names)
        ),
        MonoType::Union(members) => format!(
            "({})",
            members
                .iter()
                .map(|m| render(m, names))
                .collect::<Vec<_>>()
                .join(" | ")
        ),
        MonoType::Array(inner) => format!("Array[{}]", render(inner, names)),
        MonoType::Nillable(inner) => format!("Nillable[{}]", render(inner, names)),
        other => other.type_name(),
    }
}
