//! Programs built around user-defined classes

use mya::frontend::ir::build::*;
use mya::{check, Instruction, MonoType, TypeAnnotation};

/// class Point
///   def initialize(x, y); @x = x; @y = y; end
///   def x; @x; end
///   def moved(dx); Point.new(@x + dx, @y); end
/// end
fn point_class() -> Instruction {
    class(
        "Point",
        None,
        vec![
            def(
                "initialize",
                &["x", "y"],
                vec![
                    push_arg(0, 3),
                    set_ivar("@x", 3),
                    pop(3),
                    push_arg(1, 4),
                    set_ivar("@y", 4),
                ],
                2,
            ),
            def("x", &[], vec![push_ivar("@x", 7)], 6),
            def(
                "moved",
                &["dx"],
                vec![
                    push_const("Point", 10),
                    push_ivar("@x", 10),
                    push_arg(0, 10),
                    send("+", 1, 10),
                    push_ivar("@y", 10),
                    send("new", 2, 10),
                ],
                9,
            ),
        ],
        1,
    )
}

#[test]
fn test_point_methods() {
    // p = Point.new(1, 2); p.moved(3).x
    let typed = check(vec![
        point_class(),
        push_const("Point", 14),
        push_int(1, 14),
        push_int(2, 14),
        send("new", 2, 14),
        set_var("p", 14),
        push_var("p", 15),
        push_int(3, 15),
        send("moved", 1, 15),
        send("x", 0, 15),
    ])
    .unwrap();

    assert_eq!(typed.result_type, MonoType::Integer);
    assert_eq!(
        typed.class_ivars("Point"),
        vec![
            ("@x".to_string(), MonoType::Integer),
            ("@y".to_string(), MonoType::Integer),
        ]
    );
}

#[test]
fn test_class_typed_parameter_annotation() {
    // def origin_x(p: Point) p.x end
    let typed = check(vec![
        point_class(),
        def_with_params(
            "origin_x",
            vec![mya::Param::annotated("p", TypeAnnotation::named("Point"))],
            vec![push_arg(0, 15), send("x", 0, 15)],
            14,
        ),
        push_const("Point", 17),
        push_int(0, 17),
        push_int(0, 17),
        send("new", 2, 17),
        call("origin_x", 1, 17),
    ])
    .unwrap();
    assert_eq!(typed.result_type, MonoType::Integer);
}

#[test]
fn test_array_of_instances() {
    let typed = check(vec![
        class("Leaf", None, vec![], 1),
        push_const("Leaf", 2),
        send("new", 0, 2),
        push_const("Leaf", 2),
        send("new", 0, 2),
        push_array(2, 2),
        send("first", 0, 2),
    ])
    .unwrap();
    assert_eq!(typed.result_type, MonoType::class("Leaf"));
}

#[test]
fn test_inheritance_chain_ivars() {
    let typed = check(vec![
        class(
            "Shape",
            None,
            vec![def(
                "initialize",
                &["name"],
                vec![push_arg(0, 3), set_ivar("@name", 3)],
                2,
            )],
            1,
        ),
        class(
            "Square",
            Some("Shape"),
            vec![def(
                "resize",
                &["side"],
                vec![push_arg(0, 7), set_ivar("@side", 7)],
                6,
            )],
            5,
        ),
        push_const("Square", 10),
        push_str("unit", 10),
        send("new", 1, 10),
        push_int(4, 10),
        send("resize", 1, 10),
    ])
    .unwrap();

    assert_eq!(
        typed.class_ivars("Square"),
        vec![
            ("@name".to_string(), MonoType::String),
            ("@side".to_string(), MonoType::Integer),
        ]
    );
    assert_eq!(typed.result_type, MonoType::Integer);
}
