//! Shared fixtures for the integration tests: a customer model covering
//! every kind of member the binding engine supports, and a file-backed
//! SQLite configuration with procedures over a `customers` table.
#![allow(dead_code)]

use chrono::NaiveDateTime;
use dbautofill::core::{DbParameter, DbType, DbValue};
use dbautofill::{DbAutoFill, DbAutoFillError, DbCustomType, DbModel, FillBehavior, ModelDescriptor, Result};
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};
use uuid::Uuid;

/// Amount in cents, exchanged with the database as a decimal string.
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

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub external_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub created: NaiveDateTime,
    pub balance: Money,
    pub active: bool,
    pub cached_label: String,
}

impl DbModel for Customer {
    fn descriptor() -> ModelDescriptor<Self> {
        ModelDescriptor::record("Customer")
            .annotate(DbAutoFill::new().prefix("p_"))
            .property("Id", |c: &Customer| &c.id, |c, v| c.id = v)
            .with(DbAutoFill::new().fill_behavior(FillBehavior::FromDb))
            .property("ExternalId", |c: &Customer| &c.external_id, |c, v| c.external_id = v)
            .with(DbAutoFill::new().db_type(DbType::Guid))
            .property("Name", |c: &Customer| &c.name, |c, v| c.name = v)
            .property("Email", |c: &Customer| &c.email, |c, v| c.email = v)
            .with(DbAutoFill::new().allow_missing())
            .property("Created", |c: &Customer| &c.created, |c, v| c.created = v)
            .with(DbAutoFill::new().alias("CreatedAt"))
            .custom_property("Balance", |c: &Customer| &c.balance, |c, v| c.balance = v)
            .field("Active", |c: &Customer| &c.active, |c, v| c.active = v)
            .with(DbAutoFill::new().db_type(DbType::Boolean))
            .field("CachedLabel", |c: &Customer| &c.cached_label, |c, v| c.cached_label = v)
            .with(DbAutoFill::new().fill_behavior(FillBehavior::None))
    }
}

/// Search criteria bound through a suffix instead of a prefix.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub min_cents: i64,
    pub active: bool,
}

impl DbModel for CustomerFilter {
    fn descriptor() -> ModelDescriptor<Self> {
        ModelDescriptor::record("CustomerFilter")
            .annotate(DbAutoFill::new().suffix("_in").fill_behavior(FillBehavior::ToDb))
            .field("MinBalance", |f: &CustomerFilter| &f.min_cents, |f, v| f.min_cents = v)
            .field("Active", |f: &CustomerFilter| &f.active, |f, v| f.active = v)
    }
}

pub fn sample_customer(name: &str, cents: i64) -> Customer {
    Customer {
        id: 0,
        external_id: Uuid::new_v4(),
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        created: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap(),
        balance: Money { cents },
        active: true,
        cached_label: "not stored".to_string(),
    }
}

/// Writes a configuration pointing at `db_path` and returns the file.
pub fn write_config(dir: &Path, db_path: &Path) -> NamedTempFile {
    let mut file = NamedTempFile::new_in(dir).unwrap();
    let content = format!(
        r#"
[connection]
path = "{}"
setup = """
CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    email TEXT,
    created_at TEXT NOT NULL,
    balance NUMERIC NOT NULL,
    active INTEGER NOT NULL
);
"""

[[procedures]]
name = "InsertCustomer"
sql = "INSERT INTO customers (external_id, name, email, created_at, balance, active) VALUES (:p_ExternalId, :p_Name, :p_Email, :p_CreatedAt, :p_Balance, :p_Active)"

[[procedures]]
name = "ListCustomers"
sql = "SELECT id AS Id, external_id AS ExternalId, name AS Name, email AS Email, created_at AS CreatedAt, balance AS Balance, active AS Active FROM customers ORDER BY id"

[[procedures]]
name = "ListCustomersWithoutEmail"
sql = "SELECT id AS Id, external_id AS ExternalId, name AS Name, created_at AS CreatedAt, balance AS Balance, active AS Active FROM customers ORDER BY id"

[[procedures]]
name = "FindCustomers"
sql = "SELECT id AS Id, external_id AS ExternalId, name AS Name, email AS Email, created_at AS CreatedAt, balance AS Balance, active AS Active FROM customers WHERE balance * 100 >= :MinBalance_in AND active = :Active_in ORDER BY id"

[[procedures]]
name = "CountCustomers"
sql = "SELECT COUNT(*) AS Total FROM customers"

[[procedures]]
name = "CustomerNames"
sql = "SELECT name AS Name FROM customers ORDER BY id"
"#,
        db_path.display()
    );
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// A fresh database file and a configuration for it.
pub struct Fixture {
    pub dir: TempDir,
    pub config: NamedTempFile,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("customers.db");
        let config = write_config(dir.path(), &db_path);
        Fixture { dir, config }
    }

    pub fn config_path(&self) -> &Path {
        self.config.path()
    }
}
