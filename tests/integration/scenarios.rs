//! End-to-end checks of whole programs through the public API

use mya::frontend::ir::build::*;
use mya::{check, Instruction, MonoType, TypeError};

fn type_error(program: Vec<Instruction>) -> TypeError {
    let err = check(program).unwrap_err();
    err.downcast_ref::<mya::frontend::CheckError>()
        .and_then(|e| match e {
            mya::frontend::CheckError::Type(t) => Some(t.clone()),
            _ => None,
        })
        .expect("expected a type error")
}

#[test]
fn test_counter_loop() {
    // total = 0; i = 0
    // while i < 10; total = total + i; i = i + 1; end
    // total
    let program = vec![
        push_int(0, 1),
        set_var("total", 1),
        push_int(0, 2),
        set_var("i", 2),
        while_loop(
            vec![push_var("i", 3), push_int(10, 3), send("<", 1, 3)],
            vec![
                push_var("total", 4),
                push_var("i", 4),
                send("+", 1, 4),
                set_var("total", 4),
                push_var("i", 5),
                push_int(1, 5),
                send("+", 1, 5),
                set_var("i", 5),
            ],
            3,
        ),
        pop(6),
        push_var("total", 7),
    ];
    let typed = check(program).unwrap();
    assert_eq!(typed.result_type, MonoType::Integer);
}

#[test]
fn test_generic_helpers_used_at_several_types() {
    // def pick(flag, a, b) if flag then a else b end end
    let program = vec![
        def(
            "pick",
            &["flag", "a", "b"],
            vec![
                push_arg(0, 2),
                if_else(vec![push_arg(1, 2)], vec![push_arg(2, 2)], 2),
            ],
            1,
        ),
        push_true(4),
        push_int(1, 4),
        push_int(2, 4),
        call("pick", 3, 4),
        set_var("n", 4),
        push_false(5),
        push_str("a", 5),
        push_str("b", 5),
        call("pick", 3, 5),
    ];
    let typed = check(program).unwrap();
    assert_eq!(typed.instructions[5].ty(), Some(&MonoType::Integer));
    assert_eq!(typed.result_type, MonoType::String);
}

#[test]
fn test_sum_of_array_elements() {
    // def sum_first_two(xs) xs.first + xs.last end
    let program = vec![
        def(
            "sum_first_two",
            &["xs"],
            vec![
                push_arg(0, 2),
                send("first", 0, 2),
                push_arg(0, 2),
                send("last", 0, 2),
                send("+", 1, 2),
            ],
            1,
        ),
        push_int(1, 4),
        push_int(2, 4),
        push_array(2, 4),
        call("sum_first_two", 1, 4),
    ];
    let typed = check(program).unwrap();
    assert_eq!(typed.result_type, MonoType::Integer);
    assert_eq!(
        typed.instructions[0].ty(),
        Some(&MonoType::func(
            vec![MonoType::array(MonoType::Integer)],
            MonoType::Integer
        ))
    );
}

#[test]
fn test_optional_value_with_default() {
    // name = nil; name = "mya"; name.value_or("?")
    let program = vec![
        push_nil(1),
        set_var("name", 1),
        push_str("mya", 2),
        set_var("name", 2),
        push_var("name", 3),
        push_str("?", 3),
        send("value_or", 1, 3),
    ];
    let typed = check(program).unwrap();
    assert_eq!(typed.result_type, MonoType::String);
    assert_eq!(
        typed.instructions[1].ty(),
        Some(&MonoType::nillable(MonoType::String))
    );
}

#[test]
fn test_clash_is_reported_through_anyhow() {
    let err = check(vec![
        push_int(1, 1),
        set_var("a", 1),
        push_str("x", 2),
        set_var("a", 2),
    ])
    .unwrap_err();
    assert_eq!(err.to_string(), "type checking failed");
    assert!(format!("{:#}", err).contains("you cannot change it to type String (line 2)"));
}

#[test]
fn test_uncalled_recursive_method() {
    let err = type_error(vec![def(
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
    )]);
    assert_eq!(
        err.to_string(),
        "Not enough information to infer type of parameter `n` for method `countdown` (line 1)"
    );
}

#[test]
fn test_mixed_array_is_rejected() {
    let err = type_error(vec![push_int(1, 1), push_str("a", 1), push_array(2, 1)]);
    assert!(matches!(err, TypeError::TypeClash { line: Some(1), .. }));
}
