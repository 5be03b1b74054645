//! let 多态测试：方法类型的泛化与实例化

use super::{check_err, check_ok};
use crate::frontend::core::type_system::MonoType;
use crate::frontend::ir::build::*;
use crate::frontend::ir::{InstructionKind, Param, TypeAnnotation};
use crate::frontend::typecheck::TypeError;

fn identity() -> crate::frontend::ir::Instruction {
    def("id", &["x"], vec![push_arg(0, 2)], 1)
}

/// 测试恒等方法对不同参数类型分别实例化
#[test]
fn test_identity_is_polymorphic() {
    let typed = check_ok(vec![
        identity(),
        push_int(1, 4),
        call("id", 1, 4),
        set_var("a", 4),
        push_str("s", 5),
        call("id", 1, 5),
        set_var("b", 5),
    ]);

    assert_eq!(typed.instructions[3].ty(), Some(&MonoType::Integer));
    assert_eq!(typed.instructions[6].ty(), Some(&MonoType::String));

    let Some((params, ret)) = typed.instructions[0].ty().and_then(MonoType::as_fn) else {
        panic!("`id` should have a function type");
    };
    assert_eq!(params.len(), 1);
    assert!(params[0].is_var());
    assert_eq!(&params[0], ret);
}

#[test]
fn test_generic_method_wrapping_argument_in_array() {
    let typed = check_ok(vec![
        def("wrap", &["x"], vec![push_arg(0, 2), push_array(1, 2)], 1),
        push_int(1, 4),
        call("wrap", 1, 4),
        set_var("ints", 4),
        push_true(5),
        call("wrap", 1, 5),
    ]);
    assert_eq!(
        typed.instructions[3].ty(),
        Some(&MonoType::array(MonoType::Integer))
    );
    assert_eq!(typed.result_type, MonoType::array(MonoType::Boolean));
}

#[test]
fn test_first_of_two_arguments() {
    let typed = check_ok(vec![
        def("first_of", &["a", "b"], vec![push_arg(0, 2)], 1),
        push_str("left", 4),
        push_int(2, 4),
        call("first_of", 2, 4),
    ]);
    assert_eq!(typed.result_type, MonoType::String);
}

#[test]
fn test_argument_type_flows_from_builtin_method() {
    // def inc(n) n + 1 end
    let typed = check_ok(vec![
        def(
            "inc",
            &["n"],
            vec![push_int(1, 2), push_arg(0, 2), send("+", 1, 2)],
            1,
        ),
        push_int(41, 4),
        call("inc", 1, 4),
    ]);
    assert_eq!(typed.result_type, MonoType::Integer);
    assert_eq!(
        typed.instructions[0].ty(),
        Some(&MonoType::func(vec![MonoType::Integer], MonoType::Integer))
    );
}

#[test]
fn test_annotated_parameter() {
    let typed = check_ok(vec![
        def_with_params(
            "shout",
            vec![Param::annotated("s", TypeAnnotation::named("String"))],
            vec![push_arg(0, 2), push_str("!", 2), send("+", 1, 2)],
            1,
        ),
        push_str("hey", 4),
        call("shout", 1, 4),
    ]);
    assert_eq!(typed.result_type, MonoType::String);
}

#[test]
fn test_method_body_slots_are_resolved() {
    let typed = check_ok(vec![
        def(
            "double",
            &["n"],
            vec![push_arg(0, 2), push_arg(0, 2), send("+", 1, 2)],
            1,
        ),
        push_int(2, 4),
        call("double", 1, 4),
    ]);
    let InstructionKind::Def { body, .. } = &typed.instructions[0].kind else {
        panic!("expected a method definition");
    };
    assert!(body
        .iter()
        .all(|i| i.ty() == Some(&MonoType::Integer)));
}

#[test]
fn test_locals_are_monomorphic() {
    // a = []; a << 1; a
    let typed = check_ok(vec![
        push_array(0, 1),
        set_var("a", 1),
        push_var("a", 2),
        push_int(1, 2),
        send("<<", 1, 2),
        pop(2),
        push_var("a", 3),
    ]);
    assert_eq!(typed.result_type, MonoType::array(MonoType::Integer));
}

#[test]
fn test_unconstrained_instance_of_generic_method() {
    // def empty; [] end; empty
    let err = check_err(vec![
        def("empty", &[], vec![push_array(0, 1)], 1),
        call("empty", 0, 2),
    ]);
    assert_eq!(
        err,
        TypeError::NotEnoughInformation {
            message: "Not enough information to infer type of instruction `call` (line 2)"
                .to_string(),
            line: Some(2),
        }
    );
}

#[test]
fn test_generic_method_without_calls_is_accepted() {
    let typed = check_ok(vec![def("empty", &[], vec![push_array(0, 1)], 1)]);
    let Some((_, ret)) = typed.instructions[0].ty().and_then(MonoType::as_fn) else {
        panic!("`empty` should have a function type");
    };
    assert!(matches!(ret, MonoType::Array(element) if element.is_var()));
}

#[test]
fn test_instance_of_generic_method_constrained_by_use() {
    // def empty; [] end; a = empty; a << 1
    let typed = check_ok(vec![
        def("empty", &[], vec![push_array(0, 1)], 1),
        call("empty", 0, 2),
        set_var("a", 2),
        push_var("a", 3),
        push_int(1, 3),
        send("<<", 1, 3),
    ]);
    assert_eq!(typed.result_type, MonoType::array(MonoType::Integer));
    assert_eq!(
        typed.instructions[1].ty(),
        Some(&MonoType::array(MonoType::Integer))
    );
}
