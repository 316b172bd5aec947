/// Model Registration Module
///
/// Types opt into binding by implementing `DbModel` and listing their
/// bindable members through a `ModelDescriptor` builder. Each member carries
/// its name, kind, optional annotation, and the accessors the engine uses to
/// read and assign it.
use crate::binding::metadata::DbAutoFill;
use crate::core::{DbParameter, DbValue, FromDbValue, Result, ToDbValue};
use std::rc::Rc;

/// A type whose instances can be bound to parameters and filled from rows.
///
/// ```
/// use dbautofill::binding::{DbAutoFill, DbModel, ModelDescriptor};
///
/// #[derive(Default)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl DbModel for User {
///     fn descriptor() -> ModelDescriptor<Self> {
///         ModelDescriptor::record("User")
///             .annotate(DbAutoFill::new())
///             .field("Id", |u: &User| &u.id, |u, v| u.id = v)
///             .field("Name", |u: &User| &u.name, |u, v| u.name = v)
///     }
/// }
/// ```
pub trait DbModel: Sized {
    fn descriptor() -> ModelDescriptor<Self>;
}

/// A member type with its own parameter encoding and string decoding.
///
/// The engine hands the whole parameter to `set_parameter_value` on the way
/// out, and calls `deserialize` on a default instance with the raw value's
/// string form on the way in.
pub trait DbCustomType: Default {
    fn set_parameter_value(&self, parameter: &mut DbParameter);
    fn deserialize(&mut self, serialized: &str) -> Result<()>;
}

/// Whether a member was declared as a property or a plain field.
///
/// Properties are enumerated before fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Field,
}

/// A converted value waiting to be stored on its target.
pub type Assignment<T> = Box<dyn FnOnce(&mut T)>;

pub(crate) enum Reader<T> {
    Value(Box<dyn Fn(&T) -> DbValue>),
    Custom(Box<dyn Fn(&T, &mut DbParameter)>),
}

pub(crate) enum Converter<T> {
    Value(Box<dyn Fn(&DbValue) -> Result<Assignment<T>>>),
    Custom(Box<dyn Fn(&str) -> Result<Assignment<T>>>),
}

/// One bindable member of a record type.
pub struct Member<T> {
    name: String,
    kind: MemberKind,
    annotation: Option<DbAutoFill>,
    pub(crate) reader: Reader<T>,
    pub(crate) converter: Converter<T>,
    pub(crate) null: Box<dyn Fn() -> Assignment<T>>,
}

impl<T> Member<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn annotation(&self) -> Option<&DbAutoFill> {
        self.annotation.as_ref()
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.reader, Reader::Custom(_))
    }
}

impl<T> std::fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("annotation", &self.annotation)
            .field("custom", &self.is_custom())
            .finish()
    }
}

pub(crate) struct ScalarAccess<T> {
    pub(crate) read: Box<dyn Fn(&T) -> (String, DbValue)>,
    pub(crate) write: Box<dyn Fn(&mut T, &DbValue) -> Result<()>>,
}

pub(crate) enum Shape<T> {
    Record {
        annotation: Option<DbAutoFill>,
        members: Vec<Member<T>>,
    },
    Scalar(ScalarAccess<T>),
}

/// Binding layout of a model type.
pub struct ModelDescriptor<T> {
    type_name: String,
    pub(crate) shape: Shape<T>,
}

impl<T: 'static> ModelDescriptor<T> {
    /// Starts a structured record with no type-level annotation.
    pub fn record(type_name: impl Into<String>) -> Self {
        ModelDescriptor {
            type_name: type_name.into(),
            shape: Shape::Record {
                annotation: None,
                members: Vec::new(),
            },
        }
    }

    /// A single anonymous value: outbound it yields one named value, inbound
    /// it takes the first column of the row regardless of its name.
    pub fn scalar<R, W>(type_name: impl Into<String>, read: R, write: W) -> Self
    where
        R: Fn(&T) -> (String, DbValue) + 'static,
        W: Fn(&mut T, &DbValue) -> Result<()> + 'static,
    {
        ModelDescriptor {
            type_name: type_name.into(),
            shape: Shape::Scalar(ScalarAccess {
                read: Box::new(read),
                write: Box::new(write),
            }),
        }
    }

    /// Sets the type-level default annotation.
    pub fn annotate(mut self, annotation: DbAutoFill) -> Self {
        if let Shape::Record { annotation: slot, .. } = &mut self.shape {
            *slot = Some(annotation);
        }
        self
    }

    /// Attaches an annotation to the most recently added member.
    pub fn with(mut self, annotation: DbAutoFill) -> Self {
        if let Shape::Record { members, .. } = &mut self.shape {
            if let Some(last) = members.last_mut() {
                last.annotation = Some(annotation);
            }
        }
        self
    }

    pub fn property<V, G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        V: ToDbValue + FromDbValue + 'static,
        G: Fn(&T) -> &V + 'static,
        S: Fn(&mut T, V) + 'static,
    {
        self.value_member(name.into(), MemberKind::Property, get, set)
    }

    pub fn field<V, G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        V: ToDbValue + FromDbValue + 'static,
        G: Fn(&T) -> &V + 'static,
        S: Fn(&mut T, V) + 'static,
    {
        self.value_member(name.into(), MemberKind::Field, get, set)
    }

    pub fn custom_property<V, G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        V: DbCustomType + 'static,
        G: Fn(&T) -> &V + 'static,
        S: Fn(&mut T, V) + 'static,
    {
        self.custom_member(name.into(), MemberKind::Property, get, set)
    }

    pub fn custom_field<V, G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        V: DbCustomType + 'static,
        G: Fn(&T) -> &V + 'static,
        S: Fn(&mut T, V) + 'static,
    {
        self.custom_member(name.into(), MemberKind::Field, get, set)
    }

    fn value_member<V, G, S>(self, name: String, kind: MemberKind, get: G, set: S) -> Self
    where
        V: ToDbValue + FromDbValue + 'static,
        G: Fn(&T) -> &V + 'static,
        S: Fn(&mut T, V) + 'static,
    {
        let set = Rc::new(set);
        let on_value = Rc::clone(&set);

        let member = Member {
            name,
            kind,
            annotation: None,
            reader: Reader::Value(Box::new(move |obj| get(obj).to_db_value())),
            converter: Converter::Value(Box::new(move |raw| {
                let value = V::from_db_value(raw)?;
                let set = Rc::clone(&on_value);
                Ok(Box::new(move |obj: &mut T| (*set)(obj, value)) as Assignment<T>)
            })),
            null: Box::new(move || {
                let set = Rc::clone(&set);
                Box::new(move |obj: &mut T| (*set)(obj, V::default())) as Assignment<T>
            }),
        };
        self.push(member)
    }

    fn custom_member<V, G, S>(self, name: String, kind: MemberKind, get: G, set: S) -> Self
    where
        V: DbCustomType + 'static,
        G: Fn(&T) -> &V + 'static,
        S: Fn(&mut T, V) + 'static,
    {
        let set = Rc::new(set);
        let on_value = Rc::clone(&set);

        let member = Member {
            name,
            kind,
            annotation: None,
            reader: Reader::Custom(Box::new(move |obj, parameter| {
                get(obj).set_parameter_value(parameter)
            })),
            converter: Converter::Custom(Box::new(move |serialized| {
                let mut value = V::default();
                value.deserialize(serialized)?;
                let set = Rc::clone(&on_value);
                Ok(Box::new(move |obj: &mut T| (*set)(obj, value)) as Assignment<T>)
            })),
            null: Box::new(move || {
                let set = Rc::clone(&set);
                Box::new(move |obj: &mut T| (*set)(obj, V::default())) as Assignment<T>
            }),
        };
        self.push(member)
    }

    fn push(mut self, member: Member<T>) -> Self {
        if let Shape::Record { members, .. } = &mut self.shape {
            members.push(member);
        }
        self
    }
}

impl<T> ModelDescriptor<T> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.shape, Shape::Scalar(_))
    }

    /// Type-level annotation, if this is a record that carries one.
    pub fn annotation(&self) -> Option<&DbAutoFill> {
        match &self.shape {
            Shape::Record { annotation, .. } => annotation.as_ref(),
            Shape::Scalar(_) => None,
        }
    }

    /// Members in enumeration order: properties first, then fields, each in
    /// declaration order.
    pub fn members(&self) -> impl Iterator<Item = &Member<T>> {
        let members: &[Member<T>] = match &self.shape {
            Shape::Record { members, .. } => members,
            Shape::Scalar(_) => &[],
        };
        members
            .iter()
            .filter(|m| m.kind == MemberKind::Property)
            .chain(members.iter().filter(|m| m.kind == MemberKind::Field))
    }
}
