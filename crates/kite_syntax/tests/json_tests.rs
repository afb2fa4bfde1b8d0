//! Syntax forest exchange tests.
//!
//! The parser lives outside this workspace and may hand trees over as JSON.

use kite_core::text::SourceId;
use kite_syntax::*;

const HELLO_JSON: &str = r#"{
    "source": 2,
    "file_name": "hello.kt",
    "text": "print(\"hi\")",
    "root": {
        "members": [
            {
                "GlobalStatement": {
                    "Expression": {
                        "expression": {
                            "Call": {
                                "target": null,
                                "identifier": { "text": "print", "location": { "source": 2, "span": { "start": 0, "length": 5 } } },
                                "arguments": [
                                    { "Literal": { "value": { "String": "hi" }, "location": { "source": 2, "span": { "start": 6, "length": 4 } } } }
                                ],
                                "location": { "source": 2, "span": { "start": 0, "length": 11 } }
                            }
                        }
                    }
                }
            }
        ]
    }
}"#;

#[test]
fn test_deserialize_parser_output() {
    let tree = SyntaxTree::from_json(HELLO_JSON).expect("valid tree");
    assert_eq!(tree.source, SourceId(2));
    assert_eq!(tree.file_name, "hello.kt");
    assert_eq!(tree.global_statements().count(), 1);
    assert!(tree.diagnostics.is_empty());

    let statement = tree.global_statements().next().expect("one statement");
    match statement {
        StatementSyntax::Expression(ExpressionStatement { expression: ExpressionSyntax::Call(call) }) => {
            assert_eq!(call.identifier.text, "print");
            assert!(call.generic_arguments.is_empty());
            assert_eq!(call.arguments.len(), 1);
        }
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_builder_tree_survives_json_exchange() {
    let b = TreeBuilder::new(SourceId(0), "shapes.kt");
    let tree = b.finish(vec![
        b.class("Shape")
            .field("sides", "Int")
            .method(
                b.function("area")
                    .modifiers(ModifierFlags::VIRTUAL)
                    .returns("Int")
                    .body(vec![b.ret(Some(b.int(0)))])
                    .build(),
            )
            .build()
            .into(),
    ]);

    let json = tree.to_json().expect("serializable");
    let back = SyntaxTree::from_json(&json).expect("deserializable");
    let class = back.classes().next().expect("class survives");
    let method = class.methods().next().expect("method survives");
    assert_eq!(method.modifiers, ModifierFlags::VIRTUAL);
    assert_eq!(class.fields().next().map(|f| f.identifier.text.as_str()), Some("sides"));
}
