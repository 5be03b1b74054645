//! 延迟调用（第二遍解析）测试

use super::{check_err, check_ok};
use crate::frontend::core::type_system::MonoType;
use crate::frontend::ir::build::*;
use crate::frontend::ir::Instruction;
use crate::frontend::typecheck::{check_program_with_config, TypeError};
use crate::util::config::CheckerConfig;

/// def countdown(n)
///   if n == 0 then 0 else countdown(n - 1) end
/// end
fn countdown() -> Instruction {
    def(
        "countdown",
        &["n"],
        vec![
            push_arg(0, 2),
            push_int(0, 2),
            send("==", 1, 2),
            if_else(
                vec![push_int(0, 3)],
                vec![
                    push_arg(0, 5),
                    push_int(1, 5),
                    send("-", 1, 5),
                    call("countdown", 1, 5),
                ],
                2,
            ),
        ],
        1,
    )
}

/// def factorial(n)
///   if n <= 1 then 1 else n * factorial(n - 1) end
/// end
fn factorial() -> Instruction {
    def(
        "factorial",
        &["n"],
        vec![
            push_arg(0, 2),
            push_int(1, 2),
            send("<=", 1, 2),
            if_else(
                vec![push_int(1, 3)],
                vec![
                    push_arg(0, 5),
                    push_arg(0, 5),
                    push_int(1, 5),
                    send("-", 1, 5),
                    call("factorial", 1, 5),
                    send("*", 1, 5),
                ],
                2,
            ),
        ],
        1,
    )
}

#[test]
fn test_recursive_method_resolved_by_call_site() {
    let typed = check_ok(vec![countdown(), push_int(10, 9), call("countdown", 1, 9)]);
    assert_eq!(typed.result_type, MonoType::Integer);
    assert_eq!(
        typed.instructions[0].ty(),
        Some(&MonoType::func(vec![MonoType::Integer], MonoType::Integer))
    );
}

#[test]
fn test_factorial() {
    let typed = check_ok(vec![factorial(), push_int(5, 9), call("factorial", 1, 9)]);
    assert_eq!(typed.result_type, MonoType::Integer);
}

#[test]
fn test_uncalled_method_reports_parameter() {
    let err = check_err(vec![countdown()]);
    assert_eq!(
        err.to_string(),
        "Not enough information to infer type of parameter `n` for method `countdown` (line 1)"
    );
    assert!(matches!(err, TypeError::NotEnoughInformation { line: Some(1), .. }));
}

#[test]
fn test_forward_reference_to_later_method() {
    let typed = check_ok(vec![
        def("first_thing", &[], vec![call("second_thing", 0, 2)], 1),
        def("second_thing", &[], vec![push_int(42, 5)], 4),
        call("first_thing", 0, 7),
    ]);
    assert_eq!(typed.result_type, MonoType::Integer);
    assert_eq!(
        typed.instructions[0].ty(),
        Some(&MonoType::func(vec![], MonoType::Integer))
    );
}

#[test]
fn test_mutual_recursion() {
    let parity = |name: &str, other: &str, base: Instruction, line: usize| {
        def(
            name,
            &["n"],
            vec![
                push_arg(0, line + 1),
                push_int(0, line + 1),
                send("==", 1, line + 1),
                if_else(
                    vec![base],
                    vec![
                        push_arg(0, line + 2),
                        push_int(1, line + 2),
                        send("-", 1, line + 2),
                        call(other, 1, line + 2),
                    ],
                    line + 1,
                ),
            ],
            line,
        )
    };
    let typed = check_ok(vec![
        parity("is_even", "is_odd", push_true(2), 1),
        parity("is_odd", "is_even", push_false(6), 5),
        push_int(4, 9),
        call("is_even", 1, 9),
    ]);
    assert_eq!(typed.result_type, MonoType::Boolean);
    let expected = MonoType::func(vec![MonoType::Integer], MonoType::Boolean);
    assert_eq!(typed.instructions[0].ty(), Some(&expected));
    assert_eq!(typed.instructions[1].ty(), Some(&expected));
}

#[test]
fn test_deferred_slot_is_known_after_check() {
    let typed = check_ok(vec![countdown(), push_int(3, 9), call("countdown", 1, 9)]);
    let crate::frontend::ir::InstructionKind::Def { body, .. } = &typed.instructions[0].kind
    else {
        panic!("expected a method definition");
    };
    assert_eq!(body[2].ty(), Some(&MonoType::Boolean));
    assert!(!body[2].slot.is_pending());
}

#[test]
fn test_deferred_missing_method() {
    let err = check_err(vec![
        def("call_it", &["x"], vec![push_arg(0, 2), send("missing", 0, 2)], 1),
        push_int(1, 4),
        call("call_it", 1, 4),
    ]);
    assert_eq!(
        err,
        TypeError::UndefinedSymbol {
            name: "missing".to_string(),
            message: "undefined method `missing` for Integer (line 2)".to_string(),
            line: Some(2),
        }
    );
}

#[test]
fn test_deferred_argument_count() {
    let err = check_err(vec![
        def(
            "call_it",
            &["x"],
            vec![push_arg(0, 2), push_int(1, 2), push_int(2, 2), send("+", 2, 2)],
            1,
        ),
        push_int(1, 4),
        call("call_it", 1, 4),
    ]);
    assert_eq!(
        err.to_string(),
        "method + expects 1 arguments, got 2 (line 2)"
    );
}

#[test]
fn test_deferred_call_type_clash() {
    // def call_it(x) x + "s" end; call_it(1)
    let err = check_err(vec![
        def(
            "call_it",
            &["x"],
            vec![push_arg(0, 2), push_str("s", 2), send("+", 1, 2)],
            1,
        ),
        push_int(1, 4),
        call("call_it", 1, 4),
    ]);
    assert!(matches!(err, TypeError::TypeClash { line: Some(2), .. }));
    assert!(err
        .to_string()
        .starts_with("`Integer#+` resolved to ([Integer] -> Integer), which cannot unify with ([String] -> "));
}

#[test]
fn test_round_limit() {
    let config = CheckerConfig {
        max_deferred_rounds: 0,
        ..CheckerConfig::default()
    };
    let err = check_program_with_config(
        vec![countdown(), push_int(10, 9), call("countdown", 1, 9)],
        config,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Not enough information to infer receiver type of `==` (line 2)"
    );
}
