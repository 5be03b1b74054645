//! 类注册表
//!
//! 记录已定义的类、它们的父类和实例变量。实例变量的类型保存在这里，
//! 而不是作用域环境中，因此方法体对环境的复制不会丢失它们。

use super::builtins::OBJECT;
use crate::frontend::core::type_system::MonoType;
use indexmap::IndexMap;

/// 类定义
#[derive(Debug, Clone, PartialEq)]
pub struct ClassType {
    pub name: String,
    pub superclass: Option<String>,
    /// 本类声明的实例变量（按首次赋值顺序）
    pub ivars: IndexMap<String, MonoType>,
}

/// 类注册表
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: IndexMap<String, ClassType>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        let mut registry = ClassRegistry {
            classes: IndexMap::new(),
        };
        registry.register(OBJECT, None);
        registry
    }
}

impl ClassRegistry {
    /// 创建注册表（已包含 `Object`）
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册类；重复注册（重新打开类）保留已有的定义
    pub fn register(
        &mut self,
        name: &str,
        superclass: Option<&str>,
    ) {
        self.classes
            .entry(name.to_string())
            .or_insert_with(|| ClassType {
                name: name.to_string(),
                superclass: superclass.map(str::to_string),
                ivars: IndexMap::new(),
            });
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.classes.contains_key(name)
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&ClassType> {
        self.classes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassType> {
        self.classes.values()
    }

    /// 方法查找链：自身、各级父类，最后是 `Object`
    pub fn ancestors(
        &self,
        name: &str,
    ) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = Some(name.to_string());
        while let Some(class) = current {
            if chain.contains(&class) {
                break;
            }
            current = self.classes.get(&class).and_then(|c| c.superclass.clone());
            chain.push(class);
        }
        if !chain.iter().any(|c| c == OBJECT) {
            chain.push(OBJECT.to_string());
        }
        chain
    }

    /// 沿继承链查找声明了该实例变量的类
    pub fn ivar_owner(
        &self,
        class: &str,
        ivar: &str,
    ) -> Option<String> {
        self.ancestors(class).into_iter().find(|c| {
            self.classes
                .get(c)
                .is_some_and(|class| class.ivars.contains_key(ivar))
        })
    }

    /// 沿继承链查找实例变量的类型
    pub fn ivar_type(
        &self,
        class: &str,
        ivar: &str,
    ) -> Option<&MonoType> {
        let owner = self.ivar_owner(class, ivar)?;
        self.classes.get(&owner).and_then(|c| c.ivars.get(ivar))
    }

    /// 在 `class` 上声明实例变量
    pub fn declare_ivar(
        &mut self,
        class: &str,
        ivar: &str,
        ty: MonoType,
    ) {
        if let Some(class) = self.classes.get_mut(class) {
            class.ivars.insert(ivar.to_string(), ty);
        }
    }

    /// 所有类的所有实例变量类型
    pub fn ivar_types(&self) -> impl Iterator<Item = &MonoType> {
        self.classes.values().flat_map(|c| c.ivars.values())
    }

    pub fn ivar_types_mut(&mut self) -> impl Iterator<Item = &mut MonoType> {
        self.classes.values_mut().flat_map(|c| c.ivars.values_mut())
    }

    /// 完整的实例变量列表（含继承的），父类在前
    pub fn all_ivars(
        &self,
        name: &str,
    ) -> Vec<(String, MonoType)> {
        let mut ivars: IndexMap<String, MonoType> = IndexMap::new();
        for class in self.ancestors(name).iter().rev() {
            if let Some(class) = self.classes.get(class) {
                for (ivar, ty) in &class.ivars {
                    ivars.entry(ivar.clone()).or_insert_with(|| ty.clone());
                }
            }
        }
        ivars.into_iter().collect()
    }
}
