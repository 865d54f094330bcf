//! Rule definition.
//!
//! Rules are accumulated by an [`AbilityBuilder`] and frozen into an
//! [`Ability`]. Each `can`/`cannot` call fans out over every action and every
//! subject it is given, producing one rule per pair.
//!
//! Most hosts go through [`define_ability_full`] (grants and denials) or
//! [`define_ability_permit_only`] (grants only), which own the builder for the
//! duration of a definition callback.

use std::cell::RefCell;

use serde_json::Value;

use crate::ability::Ability;
use crate::errors::{AbilityError, AbilityResult};
use crate::models::subject::{normalize_subject_value, value_kind};
use crate::models::{Rule, RuleOptions, SubjectName};

/// One or more actions given to a definition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actions(Vec<String>);

impl Actions {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for Actions {
    fn from(action: &str) -> Self {
        Actions(vec![action.to_string()])
    }
}

impl From<String> for Actions {
    fn from(action: String) -> Self {
        Actions(vec![action])
    }
}

impl<S: Into<String>> From<Vec<S>> for Actions {
    fn from(actions: Vec<S>) -> Self {
        Actions(actions.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Actions {
    fn from(actions: [S; N]) -> Self {
        Actions(actions.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for Actions {
    fn from(actions: &[&str]) -> Self {
        Actions(actions.iter().map(|action| action.to_string()).collect())
    }
}

impl TryFrom<&Value> for Actions {
    type Error = AbilityError;

    /// A JSON string, or an array made only of strings.
    fn try_from(value: &Value) -> AbilityResult<Self> {
        match value {
            Value::String(action) => Ok(Actions(vec![action.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(action) => Ok(action.clone()),
                    other => Err(AbilityError::invalid_argument(format!(
                        "action list contains {}",
                        value_kind(other)
                    ))),
                })
                .collect::<AbilityResult<Vec<_>>>()
                .map(Actions),
            other => Err(AbilityError::invalid_argument(format!(
                "expected an action or a list of actions, got {}",
                value_kind(other)
            ))),
        }
    }
}

/// One or more subjects given to a definition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subjects(Vec<SubjectName>);

impl Subjects {
    pub fn as_slice(&self) -> &[SubjectName] {
        &self.0
    }
}

impl From<&str> for Subjects {
    fn from(subject: &str) -> Self {
        Subjects(vec![subject.into()])
    }
}

impl From<String> for Subjects {
    fn from(subject: String) -> Self {
        Subjects(vec![subject.into()])
    }
}

impl From<SubjectName> for Subjects {
    fn from(subject: SubjectName) -> Self {
        Subjects(vec![subject])
    }
}

impl<S: Into<SubjectName>> From<Vec<S>> for Subjects {
    fn from(subjects: Vec<S>) -> Self {
        Subjects(subjects.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<SubjectName>, const N: usize> From<[S; N]> for Subjects {
    fn from(subjects: [S; N]) -> Self {
        Subjects(subjects.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for Subjects {
    fn from(subjects: &[&str]) -> Self {
        Subjects(subjects.iter().map(|subject| (*subject).into()).collect())
    }
}

impl TryFrom<&Value> for Subjects {
    type Error = AbilityError;

    /// A JSON string, or an array made only of strings.
    fn try_from(value: &Value) -> AbilityResult<Self> {
        match value {
            Value::String(_) => Ok(Subjects(vec![SubjectName::try_from(value)?])),
            Value::Array(items) => items
                .iter()
                .map(|item| normalize_subject_value(item).map(SubjectName::Tag))
                .collect::<AbilityResult<Vec<_>>>()
                .map(Subjects),
            other => Err(AbilityError::invalid_subject(format!(
                "expected a subject or a list of subjects, got {}",
                value_kind(other)
            ))),
        }
    }
}

/// Mutable accumulator used while rules are being defined.
///
/// Nothing stops further calls after [`AbilityBuilder::build`]; later rules
/// simply do not appear in abilities that were already built.
#[derive(Debug, Clone, Default)]
pub struct AbilityBuilder {
    rules: Vec<Rule>,
}

impl AbilityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can(
        &mut self,
        actions: impl Into<Actions>,
        subjects: impl Into<Subjects>,
    ) -> AbilityResult<&mut Self> {
        self.can_with(actions, subjects, RuleOptions::new())
    }

    pub fn can_with(
        &mut self,
        actions: impl Into<Actions>,
        subjects: impl Into<Subjects>,
        options: RuleOptions,
    ) -> AbilityResult<&mut Self> {
        self.push(actions.into(), subjects.into(), options, false)?;
        Ok(self)
    }

    pub fn cannot(
        &mut self,
        actions: impl Into<Actions>,
        subjects: impl Into<Subjects>,
    ) -> AbilityResult<&mut Self> {
        self.cannot_with(actions, subjects, RuleOptions::new())
    }

    pub fn cannot_with(
        &mut self,
        actions: impl Into<Actions>,
        subjects: impl Into<Subjects>,
        options: RuleOptions,
    ) -> AbilityResult<&mut Self> {
        self.push(actions.into(), subjects.into(), options, true)?;
        Ok(self)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Snapshot of the rules defined so far, order preserved.
    pub fn build(&self) -> Ability {
        tracing::debug!(rules = self.rules.len(), "ability built");
        Ability::new(self.rules.iter().cloned())
    }

    // All rules of one call are created before any is appended, so a bad
    // subject leaves the builder untouched.
    fn push(
        &mut self,
        actions: Actions,
        subjects: Subjects,
        options: RuleOptions,
        inverted: bool,
    ) -> AbilityResult<()> {
        let mut created = Vec::with_capacity(actions.0.len() * subjects.0.len());
        for action in &actions.0 {
            for subject in &subjects.0 {
                created.push(Rule::new(
                    action.as_str(),
                    subject.clone(),
                    options.clone(),
                    inverted,
                )?);
            }
        }

        tracing::trace!(
            actions = ?actions.0,
            rules = created.len(),
            inverted,
            "rules defined"
        );
        self.rules.extend(created);
        Ok(())
    }
}

/// Grant-only handle given to definition callbacks.
pub struct Permit<'b> {
    builder: &'b RefCell<AbilityBuilder>,
}

impl Permit<'_> {
    pub fn can(
        &self,
        actions: impl Into<Actions>,
        subjects: impl Into<Subjects>,
    ) -> AbilityResult<&Self> {
        self.can_with(actions, subjects, RuleOptions::new())
    }

    pub fn can_with(
        &self,
        actions: impl Into<Actions>,
        subjects: impl Into<Subjects>,
        options: RuleOptions,
    ) -> AbilityResult<&Self> {
        let (actions, subjects) = (actions.into(), subjects.into());
        self.builder
            .borrow_mut()
            .can_with(actions, subjects, options)?;
        Ok(self)
    }
}

/// Denial handle given to [`define_ability_full`] callbacks.
pub struct Forbid<'b> {
    builder: &'b RefCell<AbilityBuilder>,
}

impl Forbid<'_> {
    pub fn cannot(
        &self,
        actions: impl Into<Actions>,
        subjects: impl Into<Subjects>,
    ) -> AbilityResult<&Self> {
        self.cannot_with(actions, subjects, RuleOptions::new())
    }

    pub fn cannot_with(
        &self,
        actions: impl Into<Actions>,
        subjects: impl Into<Subjects>,
        options: RuleOptions,
    ) -> AbilityResult<&Self> {
        let (actions, subjects) = (actions.into(), subjects.into());
        self.builder
            .borrow_mut()
            .cannot_with(actions, subjects, options)?;
        Ok(self)
    }
}

/// Define an ability from grants only.
///
/// ```
/// use casl::define_ability_permit_only;
///
/// let ability = define_ability_permit_only(|can| {
///     can.can("read", "Article")?.can("write", "Article")?;
///     Ok(())
/// })?;
/// assert!(ability.can("read", "Article"));
/// # Ok::<(), casl::AbilityError>(())
/// ```
pub fn define_ability_permit_only<F>(define: F) -> AbilityResult<Ability>
where
    F: FnOnce(&Permit<'_>) -> AbilityResult<()>,
{
    let builder = RefCell::new(AbilityBuilder::new());
    define(&Permit { builder: &builder })?;
    let ability = builder.into_inner().build();
    Ok(ability)
}

/// Define an ability from grants and denials.
///
/// ```
/// use casl::define_ability_full;
///
/// let ability = define_ability_full(|can, cannot| {
///     cannot.cannot("write", "Article")?;
///     can.can("read", "Article")?;
///     Ok(())
/// })?;
/// assert!(ability.cannot("write", "Article"));
/// assert!(ability.can("read", "Article"));
/// # Ok::<(), casl::AbilityError>(())
/// ```
pub fn define_ability_full<F>(define: F) -> AbilityResult<Ability>
where
    F: FnOnce(&Permit<'_>, &Forbid<'_>) -> AbilityResult<()>,
{
    let builder = RefCell::new(AbilityBuilder::new());
    define(&Permit { builder: &builder }, &Forbid { builder: &builder })?;
    let ability = builder.into_inner().build();
    Ok(ability)
}
