//! Debug JSON dump of typed programs

use mya::check;
use mya::frontend::ir::build::*;
use serde_json::Value;

#[test]
fn test_typed_program_dump() {
    let typed = check(vec![
        def("id", &["x"], vec![push_arg(0, 2)], 1),
        push_int(1, 4),
        push_nil(4),
        push_array(2, 4),
        call("id", 1, 4),
    ])
    .unwrap();

    let json = typed.to_json();
    assert_eq!(json["result_type"], "Array[Nillable[Integer]]");
    let instructions = json["instructions"].as_array().unwrap();
    assert_eq!(instructions.len(), 5);
    assert_eq!(instructions[0]["instruction"], "def");
    assert_eq!(instructions[0]["body"][0]["instruction"], "push_arg");
    assert_eq!(instructions[3]["type"], "Array[Nillable[Integer]]");
    assert_eq!(instructions[4]["name"], "id");
}

#[test]
fn test_class_ivars_in_dump() {
    let typed = check(vec![
        class(
            "Counter",
            None,
            vec![push_int(0, 2), set_ivar("@count", 2)],
            1,
        ),
    ])
    .unwrap();

    let parsed: Value = serde_json::from_str(&typed.to_json_string()).unwrap();
    let class = &parsed["instructions"][0];
    assert_eq!(class["instruction"], "class");
    assert_eq!(class["type"], "Counter");
    assert_eq!(class["ivars"]["@count"], "Integer");
    assert!(class["superclass"].is_null());
}
