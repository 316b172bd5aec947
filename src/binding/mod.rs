/// Binding Module
///
/// The declarative binding engine: annotations and policy resolution
/// (`metadata`), per-type member registration (`model`), value transfer in
/// both directions (`engine`), and standalone named values (`anonymous`).
pub mod anonymous;
pub mod engine;
pub mod metadata;
pub mod model;

pub use anonymous::{AnonymousParameter, DbAnonymousValue};
pub use engine::{
    add_anonymous_parameter, add_custom_parameter, add_parameter_with_value, fill_object,
    fill_object_with_columns, fill_parameters,
};
pub use metadata::{resolve, BindDirection, BindingPolicy, DbAutoFill, FillBehavior, Resolution};
pub use model::{DbCustomType, DbModel, Member, MemberKind, ModelDescriptor};
