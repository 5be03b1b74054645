//! IR 测试模块

mod annotation;
