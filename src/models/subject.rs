//! Subject identity.
//!
//! A rule is always defined against a subject *name*: either a free-form tag
//! (`"Article"`) or the name of a Rust type that implements [`SubjectType`].
//! At query time the host may instead hand over a live value; its identity is
//! then the name reported by [`Subject::subject_type`].

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{AbilityError, AbilityResult};

/// A live value that rules can be checked against.
///
/// Field constraints and conditions read the value only through this trait,
/// so any host type can take part without reflection.
pub trait Subject {
    /// Runtime type name, compared against a rule's subject tag.
    fn subject_type(&self) -> &str;

    /// Current value of a field, `None` when the subject has no such field.
    fn get_field(&self, name: &str) -> Option<Value>;
}

/// A type usable as a subject descriptor, e.g. `SubjectName::of::<Article>()`.
pub trait SubjectType {
    /// Defaults to the unqualified type name (`my_app::models::Article` -> `Article`).
    fn subject_name() -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Subject passed to a query: a tag, a type descriptor, or a live instance.
#[derive(Clone, Copy)]
pub enum SubjectRef<'a> {
    Tag(&'a str),
    Type(&'a str),
    Instance(&'a dyn Subject),
}

impl<'a> SubjectRef<'a> {
    pub fn tag(tag: &'a str) -> Self {
        SubjectRef::Tag(tag)
    }

    pub fn of<T: SubjectType + ?Sized>() -> SubjectRef<'static> {
        SubjectRef::Type(T::subject_name())
    }

    pub fn instance(subject: &'a dyn Subject) -> Self {
        SubjectRef::Instance(subject)
    }

    /// The name this subject is known by when matched against rule subjects.
    pub fn identity(&self) -> &'a str {
        match *self {
            SubjectRef::Tag(tag) => tag,
            SubjectRef::Type(name) => name,
            SubjectRef::Instance(subject) => subject.subject_type(),
        }
    }

    /// Field lookup. Tags and type descriptors carry no fields.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.as_instance().and_then(|subject| subject.get_field(name))
    }

    pub fn as_instance(&self) -> Option<&'a dyn Subject> {
        match *self {
            SubjectRef::Instance(subject) => Some(subject),
            _ => None,
        }
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, SubjectRef::Instance(_))
    }
}

impl fmt::Debug for SubjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectRef::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            SubjectRef::Type(name) => f.debug_tuple("Type").field(name).finish(),
            SubjectRef::Instance(subject) => f
                .debug_tuple("Instance")
                .field(&subject.subject_type())
                .finish(),
        }
    }
}

impl fmt::Display for SubjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identity())
    }
}

impl<'a> From<&'a str> for SubjectRef<'a> {
    fn from(tag: &'a str) -> Self {
        SubjectRef::Tag(tag)
    }
}

impl<'a, T: Subject> From<&'a T> for SubjectRef<'a> {
    fn from(subject: &'a T) -> Self {
        SubjectRef::Instance(subject)
    }
}

impl<'a> From<&'a dyn Subject> for SubjectRef<'a> {
    fn from(subject: &'a dyn Subject) -> Self {
        SubjectRef::Instance(subject)
    }
}

/// A dynamically shaped subject instance: a type name plus a JSON object of fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    kind: String,
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Snapshot a serializable host value, named after its [`SubjectType`].
    pub fn from_serialize<T: SubjectType + Serialize>(value: &T) -> AbilityResult<Self> {
        let kind = T::subject_name();
        match serde_json::to_value(value) {
            Ok(Value::Object(fields)) => Ok(Self {
                kind: kind.to_string(),
                fields,
            }),
            Ok(other) => Err(AbilityError::invalid_subject(format!(
                "{kind} serializes to {}, expected an object",
                value_kind(&other)
            ))),
            Err(err) => Err(AbilityError::invalid_subject(format!(
                "failed to serialize {kind}: {err}"
            ))),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Subject for Record {
    fn subject_type(&self) -> &str {
        &self.kind
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}

/// Subject argument given while defining rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubjectName {
    Tag(String),
    Type(&'static str),
}

impl SubjectName {
    pub fn of<T: SubjectType + ?Sized>() -> Self {
        SubjectName::Type(T::subject_name())
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubjectName::Tag(tag) => tag,
            SubjectName::Type(name) => name,
        }
    }
}

impl From<&str> for SubjectName {
    fn from(tag: &str) -> Self {
        SubjectName::Tag(tag.to_string())
    }
}

impl From<String> for SubjectName {
    fn from(tag: String) -> Self {
        SubjectName::Tag(tag)
    }
}

impl From<&String> for SubjectName {
    fn from(tag: &String) -> Self {
        SubjectName::Tag(tag.clone())
    }
}

impl TryFrom<&Value> for SubjectName {
    type Error = AbilityError;

    fn try_from(value: &Value) -> AbilityResult<Self> {
        normalize_subject_value(value).map(SubjectName::Tag)
    }
}

/// Resolve a definition-time subject to the tag stored on a rule.
pub fn normalize_subject(value: &SubjectName) -> AbilityResult<String> {
    let name = value.as_str();
    if name.is_empty() {
        return Err(AbilityError::invalid_subject("subject name must not be empty"));
    }
    Ok(name.to_string())
}

/// Same as [`normalize_subject`] for untyped input: only JSON strings are subjects.
pub fn normalize_subject_value(value: &Value) -> AbilityResult<String> {
    match value {
        Value::String(tag) => normalize_subject(&SubjectName::Tag(tag.clone())),
        other => Err(AbilityError::invalid_subject(format!(
            "expected a subject name, got {}",
            value_kind(other)
        ))),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Article;
    impl SubjectType for Article {}

    struct Custom;
    impl SubjectType for Custom {
        fn subject_name() -> &'static str {
            "BlogPost"
        }
    }

    #[derive(Serialize)]
    struct Book {
        title: String,
        pages: u32,
    }
    impl SubjectType for Book {}

    #[test]
    fn type_descriptor_uses_unqualified_name() {
        assert_eq!(Article::subject_name(), "Article");
        assert_eq!(SubjectName::of::<Article>().as_str(), "Article");
        assert_eq!(SubjectRef::of::<Custom>().identity(), "BlogPost");
    }

    #[test]
    fn generic_arguments_are_stripped() {
        assert_eq!(short_type_name("alloc::vec::Vec<my::Thing>"), "Vec");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn identity_resolution_covers_every_form() {
        let record = Record::new("Article").with_field("published", true);
        assert_eq!(SubjectRef::tag("Article").identity(), "Article");
        assert_eq!(SubjectRef::of::<Article>().identity(), "Article");
        assert_eq!(SubjectRef::from(&record).identity(), "Article");
    }

    #[test]
    fn only_instances_expose_fields() {
        let record = Record::new("Article").with_field("published", true);
        assert_eq!(SubjectRef::from(&record).field("published"), Some(json!(true)));
        assert_eq!(SubjectRef::from(&record).field("missing"), None);
        assert_eq!(SubjectRef::tag("Article").field("published"), None);
        assert_eq!(SubjectRef::of::<Article>().field("published"), None);
    }

    #[test]
    fn normalize_rejects_empty_and_non_string_values() {
        assert_eq!(normalize_subject(&"Article".into()).unwrap(), "Article");
        assert!(matches!(
            normalize_subject(&"".into()),
            Err(AbilityError::InvalidSubject(_))
        ));
        assert_eq!(normalize_subject_value(&json!("User")).unwrap(), "User");
        for bad in [json!(42), json!(null), json!({"name": "User"}), json!(["User"])] {
            assert!(matches!(
                normalize_subject_value(&bad),
                Err(AbilityError::InvalidSubject(_))
            ));
        }
    }

    #[test]
    fn record_from_serialize_takes_type_name_and_fields() {
        let book = Book {
            title: "Dune".into(),
            pages: 412,
        };
        let record = Record::from_serialize(&book).unwrap();
        assert_eq!(record.kind(), "Book");
        assert_eq!(record.get_field("pages"), Some(json!(412)));
    }

    #[test]
    fn record_from_non_object_fails() {
        #[derive(Serialize)]
        struct Score(u32);
        impl SubjectType for Score {}

        let err = Record::from_serialize(&Score(3)).unwrap_err();
        assert_eq!(err.code(), "invalid_subject");
    }
}
