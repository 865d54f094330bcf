//! Permission rules.
//!
//! A [`Rule`] ties one action to one subject tag, optionally narrowed by
//! exact field values and by condition predicates. Inverted rules ("cannot")
//! are not negated verdicts: a mismatch *validates* them, which lets a single
//! ordered list express both grants and exclusions.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::args::Args;
use super::subject::{normalize_subject, SubjectName, SubjectRef};
use crate::errors::AbilityResult;

/// Required field values, matched with exact equality.
pub type Fields = Map<String, Value>;

/// Predicate over the queried subject and the query's extra arguments.
pub type Condition = Arc<dyn Fn(SubjectRef<'_>, &Args) -> bool + Send + Sync>;

/// Optional refinements shared by every rule produced from one definition call.
#[derive(Clone, Default)]
pub struct RuleOptions {
    pub fields: Option<Fields>,
    pub conditions: Option<Vec<Condition>>,
    pub reason: Option<String>,
}

impl RuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(SubjectRef<'_>, &Args) -> bool + Send + Sync + 'static,
    {
        self.conditions
            .get_or_insert_with(Vec::new)
            .push(Arc::new(condition));
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Debug for RuleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleOptions")
            .field("fields", &self.fields)
            .field("conditions", &self.conditions.as_ref().map(Vec::len))
            .field("reason", &self.reason)
            .finish()
    }
}

/// One grant (`inverted == false`) or denial (`inverted == true`).
#[derive(Clone)]
pub struct Rule {
    action: String,
    subject: String,
    fields: Option<Fields>,
    conditions: Option<Vec<Condition>>,
    inverted: bool,
    reason: Option<String>,
}

impl Rule {
    /// Fails with `InvalidSubject` when the subject name is empty.
    pub fn new(
        action: impl Into<String>,
        subject: impl Into<SubjectName>,
        options: RuleOptions,
        inverted: bool,
    ) -> AbilityResult<Self> {
        let subject = normalize_subject(&subject.into())?;
        Ok(Self {
            action: action.into(),
            subject,
            fields: options.fields,
            conditions: options.conditions,
            inverted,
            reason: options.reason,
        })
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn fields(&self) -> Option<&Fields> {
        self.fields.as_ref()
    }

    pub fn conditions(&self) -> Option<&[Condition]> {
        self.conditions.as_deref()
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Whether this rule holds for `subject`.
    ///
    /// Identity, fields and conditions are checked in that order. The first
    /// failing check returns `inverted`; if all pass the result is `!inverted`.
    pub fn valid(&self, subject: SubjectRef<'_>, args: &Args) -> bool {
        if subject.identity() != self.subject {
            return self.inverted;
        }

        if let Some(fields) = self.fields.as_ref().filter(|fields| !fields.is_empty()) {
            if !matches_fields(fields, subject) {
                return self.inverted;
            }
        }

        if let Some(conditions) = self.conditions.as_ref().filter(|c| !c.is_empty()) {
            if !conditions.iter().all(|condition| condition(subject, args)) {
                return self.inverted;
            }
        }

        !self.inverted
    }
}

fn matches_fields(fields: &Fields, subject: SubjectRef<'_>) -> bool {
    let Some(instance) = subject.as_instance() else {
        return false;
    };
    fields
        .iter()
        .all(|(name, expected)| instance.get_field(name).as_ref() == Some(expected))
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("action", &self.action)
            .field("subject", &self.subject)
            .field("fields", &self.fields)
            .field("conditions", &self.conditions.as_ref().map(Vec::len))
            .field("inverted", &self.inverted)
            .field("reason", &self.reason)
            .finish()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.inverted { "cannot" } else { "can" };
        write!(f, "{} {} {}", verb, self.action, self.subject)?;
        if let Some(fields) = self.fields.as_ref().filter(|fields| !fields.is_empty()) {
            write!(f, " where {}", Value::Object(fields.clone()))?;
        }
        if let Some(count) = self.conditions.as_ref().map(Vec::len).filter(|n| *n > 0) {
            write!(f, " if {} condition(s)", count)?;
        }
        Ok(())
    }
}

// Conditions are opaque closures, so only their count is reported.
impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Rule", 6)?;
        state.serialize_field("action", &self.action)?;
        state.serialize_field("subject", &self.subject)?;
        state.serialize_field("fields", &self.fields)?;
        state.serialize_field("conditions", &self.conditions.as_ref().map(Vec::len))?;
        state.serialize_field("inverted", &self.inverted)?;
        state.serialize_field("reason", &self.reason)?;
        state.end()
    }
}
