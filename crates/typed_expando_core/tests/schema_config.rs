use serde_json::json;
use typed_expando_core::{
    ExpandoError, PropertyDeclaration, PropertySchema, TypeTag, TypedExpando, Value,
};

#[test]
fn schema_deserializes_text_type_names_in_order() {
    let schema: PropertySchema = serde_json::from_value(json!({
        "properties": [
            { "name": "Name", "type": "text" },
            { "name": "Age", "type": "int?" },
            { "name": "Tags", "type": "list<text>" }
        ]
    }))
    .expect("schema should deserialize");

    assert_eq!(
        schema.properties,
        vec![
            PropertyDeclaration::new("Name", TypeTag::Text),
            PropertyDeclaration::new("Age", TypeTag::nullable(TypeTag::Int)),
            PropertyDeclaration::new("Tags", TypeTag::list(TypeTag::Text)),
        ]
    );

    let expando = TypedExpando::from_schema(&schema).expect("expando from schema");
    assert_eq!(expando.keys().collect::<Vec<_>>(), vec!["Name", "Age", "Tags"]);
    assert_eq!(expando.get("Age").expect("Age"), Value::Null);
}

#[test]
fn schema_rejects_unknown_type_names() {
    let err = serde_json::from_value::<PropertySchema>(json!({
        "properties": [{ "name": "Age", "type": "integer" }]
    }))
    .expect_err("unknown type must fail");
    assert!(
        err.to_string().contains("type name is unsupported: integer"),
        "unexpected error: {err}"
    );
}

#[test]
fn schema_with_repeated_name_fails_on_apply() {
    let schema = PropertySchema::new()
        .with("Age", TypeTag::Int)
        .with("Age", TypeTag::Text);
    let err = TypedExpando::from_schema(&schema).expect_err("duplicate must fail");
    assert_eq!(err, ExpandoError::DuplicateProperty("Age".to_string()));
}

#[test]
fn missing_properties_field_is_an_empty_schema() {
    let schema: PropertySchema =
        serde_json::from_value(json!({})).expect("empty schema should deserialize");
    assert!(TypedExpando::from_schema(&schema)
        .expect("empty expando")
        .is_empty());
}

#[test]
fn descriptor_table_serializes_for_embedding_layers() {
    let mut expando = TypedExpando::new();
    expando
        .add_property("Age", TypeTag::nullable(TypeTag::Int))
        .expect("Age");
    expando
        .add_property("Tags", TypeTag::list(TypeTag::Text))
        .expect("Tags");

    let table = serde_json::to_value(expando.descriptors()).expect("descriptor json");
    assert_eq!(
        table,
        json!([
            { "name": "Age", "type": "int?", "read_only": false },
            { "name": "Tags", "type": "list<text>", "read_only": false }
        ])
    );
}

#[test]
fn values_serialize_with_kind_tags() {
    assert_eq!(
        serde_json::to_value(Value::Int(20)).expect("int json"),
        json!({ "kind": "int", "value": 20 })
    );
    assert_eq!(
        serde_json::to_value(Value::Null).expect("null json"),
        json!({ "kind": "null" })
    );
    assert_eq!(
        serde_json::to_value(Value::from(vec![true])).expect("list json"),
        json!({ "kind": "list", "value": { "element": "bool", "items": [{ "kind": "bool", "value": true }] } })
    );
}
