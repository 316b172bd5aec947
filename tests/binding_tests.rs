//! Binding engine tests through the public API
//!
//! These exercise parameter filling and object filling without a database,
//! using hand-built commands and rows.

mod common;

use common::{sample_customer, Customer, CustomerFilter, Money};
use dbautofill::binding::{fill_object, fill_object_with_columns, fill_parameters};
use dbautofill::core::{DbCommand, DbRow, DbType, DbValue};
use dbautofill::{DbAnonymousValue, DbAutoFill, DbAutoFillError, DbModel, ModelDescriptor};
use insta::assert_snapshot;
use std::collections::HashSet;

fn customer_row() -> DbRow {
    DbRow::from_pairs(vec![
        ("Id", DbValue::Integer(7)),
        ("ExternalId", DbValue::Text("6f9619ff-8b86-d011-b42d-00c04fc964ff".into())),
        ("Name", DbValue::Text("Ada".into())),
        ("Email", DbValue::Null),
        ("CreatedAt", DbValue::Text("2024-03-01T09:30:00".into())),
        ("Balance", DbValue::Real(12.5)),
        ("Active", DbValue::Integer(1)),
        ("CachedLabel", DbValue::Text("overwritten".into())),
    ])
}

#[test]
fn test_customer_parameters() {
    let customer = sample_customer("Ada", 1250);
    let mut command = DbCommand::stored_procedure("InsertCustomer");
    fill_parameters(&mut command, &customer).unwrap();

    assert_eq!(
        command.parameters.names(),
        vec!["p_ExternalId", "p_Name", "p_Email", "p_CreatedAt", "p_Balance", "p_Active"]
    );

    let external_id = command.parameters.get("p_ExternalId").unwrap();
    assert_eq!(external_id.db_type, Some(DbType::Guid));
    assert_eq!(external_id.value, DbValue::Text(customer.external_id.to_string()));

    assert_eq!(
        command.parameters.get("p_CreatedAt").unwrap().value,
        DbValue::Text("2024-03-01 09:30:00".into())
    );

    let balance = command.parameters.get("p_Balance").unwrap();
    assert_eq!(balance.value, DbValue::Text("12.50".into()));
    assert_eq!(balance.db_type, Some(DbType::Decimal));

    let active = command.parameters.get("p_Active").unwrap();
    assert_eq!(active.value, DbValue::Integer(1));
    assert_eq!(active.db_type, Some(DbType::Boolean));
}

#[test]
fn test_filter_parameters_use_suffix() {
    let filter = CustomerFilter {
        min_cents: 100,
        active: false,
    };
    let mut command = DbCommand::new();
    fill_parameters(&mut command, &filter).unwrap();

    assert_eq!(command.parameters.names(), vec!["MinBalance_in", "Active_in"]);
    assert_eq!(command.parameters[1].value, DbValue::Integer(0));
}

#[test]
fn test_to_db_only_model_reads_nothing() {
    let mut filter = CustomerFilter {
        min_cents: 5,
        active: true,
    };
    let row = DbRow::from_pairs(vec![("MinBalance", DbValue::Integer(99))]);
    fill_object(&row, &mut filter).unwrap();
    assert_eq!(filter.min_cents, 5);
}

#[test]
fn test_fill_customer() {
    let mut customer = Customer {
        email: Some("stale@example.com".into()),
        cached_label: "kept".into(),
        ..Customer::default()
    };
    fill_object(&customer_row(), &mut customer).unwrap();

    assert_eq!(customer.id, 7);
    assert_eq!(customer.external_id.to_string(), "6f9619ff-8b86-d011-b42d-00c04fc964ff");
    assert_eq!(customer.name, "Ada");
    // NULL resets to the default
    assert_eq!(customer.email, None);
    assert_eq!(customer.created.to_string(), "2024-03-01 09:30:00");
    assert_eq!(customer.balance, Money { cents: 1250 });
    assert!(customer.active);
    assert_eq!(customer.cached_label, "kept");
}

#[test]
fn test_conversion_failure_leaves_customer_untouched() {
    let mut row = customer_row().values().to_vec();
    row[6] = DbValue::Text("maybe".into());
    let row = DbRow::new(customer_row().columns().to_vec(), row);

    let original = sample_customer("Grace", 1);
    let mut customer = original.clone();
    let err = fill_object(&row, &mut customer).unwrap_err();

    assert!(matches!(err, DbAutoFillError::TypeConversion(_)));
    assert_eq!(customer, original);
}

#[test]
fn test_explicit_column_set_limits_lookup() {
    let mut columns: HashSet<String> = customer_row().column_set();
    columns.remove("Email");

    let mut customer = Customer {
        email: Some("kept@example.com".into()),
        ..Customer::default()
    };
    fill_object_with_columns(&customer_row(), &columns, &mut customer).unwrap();
    assert_eq!(customer.email.as_deref(), Some("kept@example.com"));
    assert_eq!(customer.name, "Ada");
}

#[test]
fn test_column_lookup_is_case_sensitive() {
    let row = DbRow::from_pairs(vec![
        ("id", DbValue::Integer(1)),
        ("ExternalId", DbValue::Null),
        ("Name", DbValue::Null),
        ("CreatedAt", DbValue::Null),
        ("Balance", DbValue::Null),
        ("Active", DbValue::Null),
    ]);
    let err = fill_object(&row, &mut Customer::default()).unwrap_err();
    assert_snapshot!(err.to_string(), @"No column named 'Id' in reader for object 'Customer'.");
}

#[test]
fn test_anonymous_value_binds_alias() {
    let value = DbAnonymousValue::new("Limit", 25u16).unwrap();
    let mut command = DbCommand::new();
    fill_parameters(&mut command, &value).unwrap();

    assert_eq!(command.parameters.len(), 1);
    assert_eq!(command.parameters[0].name, "Limit");
    assert_eq!(command.parameters[0].value, DbValue::Integer(25));
}

#[test]
fn test_anonymous_value_with_converter() {
    let mut holder = DbAnonymousValue::with_converter("Tags", Vec::<String>::new(), |raw| {
        Ok(raw.to_string().split(',').map(str::to_string).collect())
    })
    .unwrap();
    holder.set_from_db(&DbValue::Text("a,b".into())).unwrap();
    assert_eq!(holder.value(), &vec!["a".to_string(), "b".to_string()]);

    holder.set_from_db(&DbValue::Null).unwrap();
    assert!(holder.value().is_empty());
}

#[derive(Debug, Default)]
struct Unannotated {
    name: String,
}

impl DbModel for Unannotated {
    fn descriptor() -> ModelDescriptor<Self> {
        ModelDescriptor::record("Unannotated").property("Name", |u: &Unannotated| &u.name, |u, v| u.name = v)
    }
}

#[test]
fn test_unannotated_model_binds_nothing() {
    let mut command = DbCommand::new();
    fill_parameters(&mut command, &Unannotated { name: "x".into() }).unwrap();
    assert!(command.parameters.is_empty());

    let mut target = Unannotated::default();
    let row = DbRow::from_pairs(vec![("Name", DbValue::Text("y".into()))]);
    fill_object(&row, &mut target).unwrap();
    assert_eq!(target.name, "");
}

#[derive(Debug, Default)]
struct BlankAlias {
    value: i32,
}

impl DbModel for BlankAlias {
    fn descriptor() -> ModelDescriptor<Self> {
        ModelDescriptor::record("BlankAlias")
            .field("Value", |b: &BlankAlias| &b.value, |b, v| b.value = v)
            .with(DbAutoFill::new().alias("  "))
    }
}

#[test]
fn test_blank_alias_falls_back_to_member_name() {
    let mut command = DbCommand::new();
    fill_parameters(&mut command, &BlankAlias { value: 3 }).unwrap();
    assert_eq!(command.parameters.names(), vec!["Value"]);
}
