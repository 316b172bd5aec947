/// Bind Engine Module
///
/// Moves values between model instances and the database:
/// - **Outbound**: members to named command parameters
/// - **Inbound**: result row columns to members
///
/// Both directions resolve each member's policy fresh on every call and keep
/// no state between calls.
use crate::binding::anonymous::AnonymousParameter;
use crate::binding::metadata::{resolve, BindDirection, Resolution};
use crate::binding::model::{Assignment, Converter, DbCustomType, DbModel, Reader, Shape};
use crate::core::{DbAutoFillError, DbCommand, DbParameter, DbRow, DbType, DbValue, Result, ToDbValue};
use std::collections::HashSet;
use tracing::{debug, trace};

fn checked_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DbAutoFillError::InvalidArgument(
            "Parameter name cannot be empty.".to_string(),
        ));
    }
    Ok(())
}

fn push_value(command: &mut DbCommand, name: &str, value: DbValue, db_type: Option<DbType>) {
    debug!(parameter = name, kind = ?db_type, "binding parameter");
    command.parameters.push(DbParameter {
        name: name.to_string(),
        value,
        db_type,
    });
}

/// Adds one named parameter to `command`.
///
/// `None` and other null values become an explicit `DbValue::Null`.
///
/// # Errors
///
/// Returns `DbAutoFillError::InvalidArgument` if `name` is blank.
pub fn add_parameter_with_value<V>(
    command: &mut DbCommand,
    name: &str,
    value: &V,
    db_type: Option<DbType>,
) -> Result<()>
where
    V: ToDbValue + ?Sized,
{
    checked_name(name)?;
    push_value(command, name, value.to_db_value(), db_type);
    Ok(())
}

/// Adds a parameter whose value and kind are chosen by a custom type.
pub fn add_custom_parameter<V: DbCustomType>(command: &mut DbCommand, name: &str, value: &V) -> Result<()> {
    checked_name(name)?;
    let mut parameter = DbParameter::new(name);
    value.set_parameter_value(&mut parameter);
    debug!(parameter = name, "binding custom parameter");
    command.parameters.push(parameter);
    Ok(())
}

/// Adds a parameter named by the value's alias.
pub fn add_anonymous_parameter(command: &mut DbCommand, param: &dyn AnonymousParameter) -> Result<()> {
    checked_name(param.alias())?;
    push_value(command, param.alias(), param.parameter_value(), None);
    Ok(())
}

/// Creates one parameter per outbound member of `obj`.
///
/// Members are visited properties first, then fields. Members that resolve
/// to no outbound binding are skipped. Custom value types fill the parameter
/// themselves; every other member contributes its value and, if declared, its
/// storage-kind hint.
///
/// # Errors
///
/// Returns `DbAutoFillError::InvalidArgument` if a composed parameter name is
/// empty. Nothing is added to `command` in that case.
pub fn fill_parameters<T: DbModel>(command: &mut DbCommand, obj: &T) -> Result<()> {
    let descriptor = T::descriptor();

    let (annotation, members) = match &descriptor.shape {
        Shape::Scalar(access) => {
            let (alias, value) = (access.read)(obj);
            checked_name(&alias)?;
            push_value(command, &alias, value, None);
            return Ok(());
        }
        Shape::Record { annotation, .. } => (annotation.as_ref(), descriptor.members()),
    };

    let mut pending = Vec::new();
    for member in members {
        let policy = match resolve(
            annotation,
            member.name(),
            member.annotation(),
            member.is_custom(),
            BindDirection::Outbound,
        ) {
            Resolution::Bind(policy) => policy,
            Resolution::Skip => {
                trace!(member = member.name(), "member not bound outbound");
                continue;
            }
        };

        checked_name(&policy.effective_name)?;

        let mut parameter = DbParameter::new(policy.effective_name);
        match &member.reader {
            Reader::Custom(write) => write(obj, &mut parameter),
            Reader::Value(read) => {
                parameter.value = read(obj);
                parameter.db_type = policy.declared_value_kind;
            }
        }
        pending.push(parameter);
    }

    debug!(
        model = descriptor.type_name(),
        count = pending.len(),
        "filled parameters from object"
    );
    for parameter in pending {
        command.parameters.push(parameter);
    }
    Ok(())
}

/// Fills `obj` from `row`, using the row's own column names.
pub fn fill_object<T: DbModel>(row: &DbRow, obj: &mut T) -> Result<()> {
    let columns = row.column_set();
    fill_object_with_columns(row, &columns, obj)
}

/// Fills the inbound members of `obj` from `row`.
///
/// Column lookup is exact and case-sensitive against `columns`. A missing
/// optional column leaves its member untouched; a NULL column resets the
/// member to its default. Scalar models ignore names and take the first
/// column.
///
/// Every member is converted before any is assigned, so a failed call leaves
/// `obj` as it was.
///
/// # Errors
///
/// - `DbAutoFillError::MissingField` if a required column is absent
/// - `DbAutoFillError::TypeConversion` if a value cannot be converted
pub fn fill_object_with_columns<T: DbModel>(
    row: &DbRow,
    columns: &HashSet<String>,
    obj: &mut T,
) -> Result<()> {
    let descriptor = T::descriptor();
    let type_name = descriptor.type_name().to_string();

    let annotation = match &descriptor.shape {
        Shape::Scalar(access) => {
            let raw = row.get_index(0).ok_or_else(|| DbAutoFillError::MissingField {
                column: "#0".to_string(),
                type_name: type_name.clone(),
            })?;
            return (access.write)(obj, raw);
        }
        Shape::Record { annotation, .. } => annotation.as_ref(),
    };

    let mut assignments: Vec<Assignment<T>> = Vec::new();
    for member in descriptor.members() {
        let policy = match resolve(
            annotation,
            member.name(),
            member.annotation(),
            member.is_custom(),
            BindDirection::Inbound,
        ) {
            Resolution::Bind(policy) => policy,
            Resolution::Skip => {
                trace!(member = member.name(), "member not bound inbound");
                continue;
            }
        };

        let column = policy.effective_name;
        let raw = match columns.contains(&column).then(|| row.get(&column)).flatten() {
            Some(raw) => raw,
            None if policy.required => {
                return Err(DbAutoFillError::MissingField { column, type_name });
            }
            None => {
                debug!(column = %column, model = %type_name, "optional column absent, member left as is");
                continue;
            }
        };

        trace!(column = %column, value = %raw, "reading column");

        let assignment = if raw.is_null() {
            (member.null)()
        } else {
            match &member.converter {
                Converter::Custom(convert) => convert(&raw.to_string())?,
                Converter::Value(convert) => convert(raw)?,
            }
        };
        assignments.push(assignment);
    }

    for assign in assignments {
        assign(obj);
    }
    Ok(())
}
