//! 类型系统测试模块
