/// Binding Metadata Module
///
/// Declarative annotations attached to a model type and to its members, and
/// the resolver that merges the two into one `BindingPolicy` per member and
/// binding direction.
use crate::core::DbType;

/// Which way a type or member exchanges values with the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillBehavior {
    /// Filled from result rows only
    FromDb,
    /// Sent to the database as parameters only
    ToDb,
    /// Both directions
    #[default]
    Both,
    /// Never exchanged
    None,
}

/// The direction a single bind call is moving values in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindDirection {
    /// Object to command parameters
    Outbound,
    /// Result row to object
    Inbound,
}

impl FillBehavior {
    pub fn allows(self, direction: BindDirection) -> bool {
        match (self, direction) {
            (FillBehavior::Both, _) => true,
            (FillBehavior::ToDb, BindDirection::Outbound) => true,
            (FillBehavior::FromDb, BindDirection::Inbound) => true,
            _ => false,
        }
    }
}

/// Declarative binding annotation.
///
/// Every field is optional so that a member-level annotation only overrides
/// what it actually sets. Blank strings count as unset.
///
/// ```
/// use dbautofill::binding::{DbAutoFill, FillBehavior};
///
/// let on_type = DbAutoFill::new().prefix("p_").required(true);
/// let on_member = DbAutoFill::new().suffix("_IN").fill_behavior(FillBehavior::ToDb);
/// # let _ = (on_type, on_member);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbAutoFill {
    pub alias: Option<String>,
    pub parameter_prefix: Option<String>,
    pub parameter_suffix: Option<String>,
    pub db_type: Option<DbType>,
    pub fill_behavior: Option<FillBehavior>,
    pub required: Option<bool>,
}

impl DbAutoFill {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column and parameter name to use instead of the member name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.parameter_prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.parameter_suffix = Some(suffix.into());
        self
    }

    pub fn db_type(mut self, db_type: DbType) -> Self {
        self.db_type = Some(db_type);
        self
    }

    pub fn fill_behavior(mut self, behavior: FillBehavior) -> Self {
        self.fill_behavior = Some(behavior);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Shorthand for `required(false)`: a missing column is skipped.
    pub fn allow_missing(self) -> Self {
        self.required(false)
    }
}

/// Effective binding rules for one member in one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingPolicy {
    pub direction: FillBehavior,
    /// Parameter name (outbound) or column name (inbound)
    pub effective_name: String,
    pub required: bool,
    pub declared_value_kind: Option<DbType>,
    pub custom_value_type: bool,
}

/// Outcome of resolving a member for a given direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Bind(BindingPolicy),
    Skip,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn pick<'a>(
    member: Option<&'a DbAutoFill>,
    owner: Option<&'a DbAutoFill>,
    field: fn(&'a DbAutoFill) -> Option<&'a str>,
) -> Option<&'a str> {
    member.and_then(field).or_else(|| owner.and_then(field))
}

/// Merges the type-level and member-level annotations for `member_name`.
///
/// A member with no annotation on either level never binds. Member fields
/// override type fields one by one; anything left unset falls back to
/// `Both`, required, and empty affixes. Affixes only decorate outbound
/// parameter names; the inbound column name is the alias or the bare member
/// name.
pub fn resolve(
    type_annotation: Option<&DbAutoFill>,
    member_name: &str,
    member_annotation: Option<&DbAutoFill>,
    custom_value_type: bool,
    direction: BindDirection,
) -> Resolution {
    if type_annotation.is_none() && member_annotation.is_none() {
        return Resolution::Skip;
    }

    let behavior = member_annotation
        .and_then(|a| a.fill_behavior)
        .or_else(|| type_annotation.and_then(|a| a.fill_behavior))
        .unwrap_or_default();

    if !behavior.allows(direction) {
        return Resolution::Skip;
    }

    let required = member_annotation
        .and_then(|a| a.required)
        .or_else(|| type_annotation.and_then(|a| a.required))
        .unwrap_or(true);

    let declared_value_kind = member_annotation
        .and_then(|a| a.db_type)
        .or_else(|| type_annotation.and_then(|a| a.db_type));

    let base_name = member_annotation
        .and_then(|a| non_blank(&a.alias))
        .unwrap_or(member_name);

    let effective_name = match direction {
        BindDirection::Outbound => {
            let prefix = pick(member_annotation, type_annotation, |a| non_blank(&a.parameter_prefix));
            let suffix = pick(member_annotation, type_annotation, |a| non_blank(&a.parameter_suffix));
            format!("{}{}{}", prefix.unwrap_or(""), base_name, suffix.unwrap_or(""))
        }
        BindDirection::Inbound => base_name.to_string(),
    };

    Resolution::Bind(BindingPolicy {
        direction: behavior,
        effective_name,
        required,
        declared_value_kind,
        custom_value_type,
    })
}
