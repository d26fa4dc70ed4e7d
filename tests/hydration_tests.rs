use tablemap::{TableEntity, TableError, dehydrate, hydrate};

#[derive(Debug, Clone, PartialEq, TableEntity)]
struct PlainPair {
    #[row(name = "FirstType")]
    first_type: String,
    #[row(name = "SecondType")]
    second_type: String,
}

#[derive(Debug, Clone, TableEntity)]
struct PartiallySerialized {
    #[row(name = "SerializedString")]
    serialized_string: String,
    #[row(skip)]
    not_serialized_string: String,
}

#[derive(Debug, Clone, PartialEq, TableEntity)]
struct KeyedPerson {
    #[row(partition_key)]
    id: String,
    #[row(row_key)]
    name: String,
    age: i32,
}

#[derive(Debug, Clone, TableEntity)]
struct SingleKeyed {
    #[row(partition_key, row_key)]
    key: String,
    payload: i64,
}

#[derive(Debug, Clone, TableEntity)]
struct DoubledPartitionKey {
    #[row(partition_key)]
    first: String,
    #[row(partition_key)]
    second: String,
}

#[derive(Debug, Clone, TableEntity)]
struct NumericKey {
    #[row(row_key)]
    sequence: i64,
}

#[derive(Debug, Clone, PartialEq, TableEntity)]
struct WithOptional {
    score: Option<f64>,
    label: String,
}

#[test]
fn test_plain_struct_uses_override_keys_verbatim() {
    let pair = PlainPair {
        first_type: "foo".to_string(),
        second_type: "bar".to_string(),
    };

    let row = hydrate(&pair, Some("pk"), Some("rk")).unwrap();
    assert_eq!(row.partition_key(), "pk");
    assert_eq!(row.row_key(), "rk");
    assert_eq!(row.properties().len(), 2);
    assert_eq!(
        row.property("FirstType").unwrap().value().as_str(),
        Some("foo")
    );
    assert_eq!(
        row.property("SecondType").unwrap().value().as_str(),
        Some("bar")
    );
}

#[test]
fn test_plain_struct_without_overrides_has_no_key_source() {
    let pair = PlainPair {
        first_type: "foo".to_string(),
        second_type: "bar".to_string(),
    };

    let err = hydrate(&pair, None, Some("rk")).unwrap_err();
    assert!(matches!(err, TableError::InvalidEntity(_)));
    assert!(err.to_string().contains("partition key"));
}

#[test]
fn test_skipped_field_is_absent_from_the_bag() {
    let value = PartiallySerialized {
        serialized_string: "foo".to_string(),
        not_serialized_string: "bar".to_string(),
    };

    let row = hydrate(&value, Some("pk"), Some("rk")).unwrap();
    assert_eq!(row.properties().len(), 1);
    assert_eq!(
        row.property("SerializedString").unwrap().value().as_str(),
        Some("foo")
    );
    let err = row.property("NotSerializedString").unwrap_err();
    assert!(matches!(err, TableError::PropertyNotFound(_)));
    let err = row.property("not_serialized_string").unwrap_err();
    assert!(matches!(err, TableError::PropertyNotFound(_)));
}

#[test]
fn test_key_roles_populate_keys_and_leave_the_bag() {
    let person = KeyedPerson {
        id: "pk1".to_string(),
        name: "row1".to_string(),
        age: 30,
    };

    let row = hydrate(&person, None, None).unwrap();
    assert_eq!(row.partition_key(), "pk1");
    assert_eq!(row.row_key(), "row1");
    assert_eq!(row.properties().len(), 1);
    assert_eq!(row.property("age").unwrap().value().as_i64(), Some(30));
    assert!(matches!(
        row.property("id").unwrap_err(),
        TableError::PropertyNotFound(_)
    ));
}

#[test]
fn test_explicit_keys_override_role_properties() {
    let person = KeyedPerson {
        id: "pk1".to_string(),
        name: "row1".to_string(),
        age: 30,
    };

    let row = hydrate(&person, Some("other-pk"), None).unwrap();
    assert_eq!(row.partition_key(), "other-pk");
    assert_eq!(row.row_key(), "row1");
}

#[test]
fn test_single_property_carrying_both_key_roles() {
    let single = SingleKeyed {
        key: "shared".to_string(),
        payload: 7,
    };

    let row = hydrate(&single, None, None).unwrap();
    assert_eq!(row.partition_key(), "shared");
    assert_eq!(row.row_key(), "shared");
    assert_eq!(row.partition_key(), row.row_key());
    assert_eq!(row.properties().len(), 1);
}

#[test]
fn test_duplicate_partition_key_fails_for_every_instance() {
    let value = DoubledPartitionKey {
        first: "a".to_string(),
        second: "b".to_string(),
    };

    for _ in 0..2 {
        let err = hydrate(&value, None, Some("rk")).unwrap_err();
        assert!(matches!(err, TableError::InvalidEntity(_)));
        assert!(err.to_string().contains("PartitionKey"));
    }
}

#[test]
fn test_non_string_key_role_is_invalid() {
    let value = NumericKey { sequence: 9 };
    let err = hydrate(&value, Some("pk"), None).unwrap_err();
    assert!(matches!(err, TableError::InvalidEntity(_)));
}

#[test]
fn test_none_field_becomes_null_slot_not_absence() {
    let value = WithOptional {
        score: None,
        label: "x".to_string(),
    };

    let row = hydrate(&value, Some("pk"), Some("rk")).unwrap();
    assert_eq!(row.properties().len(), 2);
    let score = row.property("score").unwrap();
    assert!(score.is_null());
    assert_eq!(score.edm_type(), tablemap::EdmType::Double);
}

#[test]
fn test_dehydrate_inverts_hydrate() {
    let person = KeyedPerson {
        id: "pk1".to_string(),
        name: "row1".to_string(),
        age: 30,
    };

    let row = hydrate(&person, None, None).unwrap();
    let back: KeyedPerson = dehydrate(&row).unwrap();
    assert_eq!(back, person);
}

#[test]
fn test_dehydrate_is_strict_for_non_optional_fields() {
    let row = tablemap::TableRow::new("pk", "rk");
    let err = dehydrate::<KeyedPerson>(&row).unwrap_err();
    assert!(matches!(err, TableError::PropertyNotFound(_)));
}

#[test]
fn test_dehydrate_is_lenient_for_optional_fields() {
    let mut row = tablemap::TableRow::new("pk", "rk");
    row.set_property("label", tablemap::EntityProperty::new("x"));

    let back: WithOptional = dehydrate(&row).unwrap();
    assert_eq!(back.score, None);
    assert_eq!(back.label, "x");
}
