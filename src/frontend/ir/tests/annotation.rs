//! 类型标注解析测试

use crate::frontend::ir::TypeAnnotation;

#[test]
fn test_parse_simple_annotation() {
    let ann: TypeAnnotation = "Integer".parse().unwrap();
    assert_eq!(ann, TypeAnnotation::named("Integer"));
}

#[test]
fn test_parse_nested_annotation() {
    let ann: TypeAnnotation = "Array[Option[String]]".parse().unwrap();
    assert_eq!(
        ann,
        TypeAnnotation::generic(
            "Array",
            TypeAnnotation::generic("Option", TypeAnnotation::named("String"))
        )
    );
    assert_eq!(ann.to_string(), "Array[Option[String]]");
}

#[test]
fn test_parse_rejects_garbage() {
    assert!("".parse::<TypeAnnotation>().is_err());
    assert!("Array[Integer".parse::<TypeAnnotation>().is_err());
    assert!("[Integer]".parse::<TypeAnnotation>().is_err());
    assert!("Foo Bar".parse::<TypeAnnotation>().is_err());
}
