//! Property-based tests for the validation engine
//!
//! ## Properties Tested
//!
//! - Re-validating a model's mapping yields an equal model
//! - A value outside one numeric bound yields exactly one violation
//! - Values inside every bound always validate

use modelgate::*;
use proptest::prelude::*;
use std::sync::Arc;

fn person_schema() -> Arc<Schema> {
    Schema::builder("Person")
        .field(
            FieldDescriptor::new("name", FieldType::Str)
                .constraints([Constraint::min_length(1), Constraint::max_length(20)]),
        )
        .field(
            FieldDescriptor::new("age", FieldType::Int)
                .constraints([Constraint::ge(0), Constraint::le(150)]),
        )
        .field(FieldDescriptor::new("score", FieldType::optional(FieldType::Float)).default_value(Value::Null))
        .field(FieldDescriptor::new("tags", FieldType::list(FieldType::Str)).default_factory(|| Value::List(vec![])))
        .build()
        .unwrap()
}

fn bounded_schema() -> Arc<Schema> {
    Schema::builder("Bounded")
        .field(FieldDescriptor::new("n", FieldType::Int).constraint(Constraint::gt(0)))
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: validate(to_mapping(validate(p))) == validate(p)
    #[test]
    fn prop_revalidation_is_idempotent(
        name in "[a-zA-Z ]{1,20}",
        age in 0i64..=150,
        score in proptest::option::of(-1e6f64..1e6),
        tags in proptest::collection::vec("[a-z]{0,8}", 0..5),
    ) {
        let schema = person_schema();
        let payload = Value::object([
            ("name", Value::from(name)),
            ("age", Value::from(age.to_string())),
            ("score", Value::from(score)),
            ("tags", Value::from(tags)),
        ]);

        let first = schema.validate(&payload);
        prop_assert!(first.is_ok(), "payload should validate: {:?}", first);
        let first = first.unwrap();
        let second = schema.validate(&first.to_mapping()).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.to_text(), second.to_text());
    }

    /// Property: violating one bound yields exactly one ConstraintViolation
    #[test]
    fn prop_one_violation_per_bound(n in i64::MIN..=0) {
        let errors = bounded_schema()
            .validate(&Value::object([("n", Value::Int(n))]))
            .unwrap_err();
        prop_assert_eq!(errors.len(), 1);
        prop_assert_eq!(
            errors.errors[0].kind,
            ErrorKind::ConstraintViolation(ConstraintKind::Minimum)
        );
        prop_assert_eq!(errors.errors[0].loc(), "n");
    }

    /// Property: values inside the bound always pass
    #[test]
    fn prop_in_bound_values_pass(n in 1i64..=i64::MAX) {
        let model = bounded_schema().validate(&Value::object([("n", Value::Int(n))])).unwrap();
        prop_assert_eq!(model.get("n"), Some(&Value::Int(n)));
    }

    /// Property: both bounds violated at once are each reported
    #[test]
    fn prop_each_failed_field_reported(name in "[a-z]{21,40}", age in 151i64..10_000) {
        let errors = person_schema()
            .validate(&Value::object([("name", Value::from(name)), ("age", Value::Int(age))]))
            .unwrap_err();
        let kinds: Vec<_> = errors.iter().filter_map(|e| e.kind.constraint()).collect();
        prop_assert_eq!(kinds, vec![ConstraintKind::MaxLength, ConstraintKind::Maximum]);
    }
}
