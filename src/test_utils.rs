/// # Test Utilities Module
///
/// Shared fixtures for the unit tests: annotated sample models, a custom
/// value type, and an in-memory SQLite provider with a few catalogued
/// procedures.
use crate::binding::{DbAutoFill, DbCustomType, DbModel, FillBehavior, ModelDescriptor};
use crate::core::db::{ProcedureCatalog, SqliteProvider};
use crate::core::{DbAutoFillError, DbParameter, DbType, DbValue, Result};

/// Type-level annotation only; both members bind by their bare names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicObject {
    pub string_property: String,
    pub int_field: i32,
}

impl DbModel for BasicObject {
    fn descriptor() -> ModelDescriptor<Self> {
        ModelDescriptor::record("BasicObject")
            .annotate(DbAutoFill::new().required(true))
            .property("StringProperty", |o: &BasicObject| &o.string_property, |o, v| o.string_property = v)
            .field("IntField", |o: &BasicObject| &o.int_field, |o, v| o.int_field = v)
    }
}

/// Prefix on the type, per-member suffix, directions and alias.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexObject {
    pub name_in: String,
    pub to_db_uuid: i32,
    pub from_db_id: i32,
    pub unsettable: i32,
    pub aliased: bool,
}

impl DbModel for ComplexObject {
    fn descriptor() -> ModelDescriptor<Self> {
        ModelDescriptor::record("ComplexObject")
            .annotate(DbAutoFill::new().required(true).prefix("p_"))
            .property("NameIN", |o: &ComplexObject| &o.name_in, |o, v| o.name_in = v)
            .with(DbAutoFill::new().suffix("_IN"))
            .property("ToDbUuid", |o: &ComplexObject| &o.to_db_uuid, |o, v| o.to_db_uuid = v)
            .with(DbAutoFill::new().fill_behavior(FillBehavior::ToDb))
            .property("FromDbId", |o: &ComplexObject| &o.from_db_id, |o, v| o.from_db_id = v)
            .with(DbAutoFill::new().fill_behavior(FillBehavior::FromDb))
            .property("Unsettable", |o: &ComplexObject| &o.unsettable, |o, v| o.unsettable = v)
            .with(DbAutoFill::new().fill_behavior(FillBehavior::None))
            .property("Aliased", |o: &ComplexObject| &o.aliased, |o, v| o.aliased = v)
            .with(DbAutoFill::new().alias("ALittleTest"))
    }
}

/// One optional member and one required member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleObject {
    pub missing_field: i32,
    pub mandatory: i32,
}

impl DbModel for SampleObject {
    fn descriptor() -> ModelDescriptor<Self> {
        ModelDescriptor::record("SampleObject")
            .annotate(DbAutoFill::new())
            .property("MissingField", |o: &SampleObject| &o.missing_field, |o, v| o.missing_field = v)
            .with(DbAutoFill::new().allow_missing())
            .property("Mandatory", |o: &SampleObject| &o.mandatory, |o, v| o.mandatory = v)
    }
}

/// Amount in cents, sent as a decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Money {
    pub cents: i64,
}

impl DbCustomType for Money {
    fn set_parameter_value(&self, parameter: &mut DbParameter) {
        let sign = if self.cents < 0 { "-" } else { "" };
        let cents = self.cents.abs();
        parameter.value = DbValue::Text(format!("{}{}.{:02}", sign, cents / 100, cents % 100));
        parameter.db_type = Some(DbType::Decimal);
    }

    fn deserialize(&mut self, serialized: &str) -> Result<()> {
        let amount: f64 = serialized
            .trim()
            .parse()
            .map_err(|e| DbAutoFillError::conversion(serialized, "Money", e))?;
        self.cents = (amount * 100.0).round() as i64;
        Ok(())
    }
}

/// In-memory provider with a `people` table and procedures over it.
pub fn sample_provider() -> SqliteProvider {
    let catalog = ProcedureCatalog::new()
        .with_procedure("GetBasic", "SELECT :StringProperty AS StringProperty, :IntField AS IntField")
        .with_procedure("CountPeople", "SELECT COUNT(*) FROM people")
        .with_procedure(
            "FindPeople",
            "SELECT name AS StringProperty, age AS IntField FROM people WHERE age >= @MinAge ORDER BY age",
        )
        .with_procedure("Broken", "SELECT * FROM no_such_table");

    SqliteProvider::new(catalog).with_setup(
        "
        CREATE TABLE people (name TEXT NOT NULL, age INTEGER NOT NULL);
        INSERT INTO people VALUES ('Ada', 36), ('Grace', 45), ('Linus', 21);
        ",
    )
}
