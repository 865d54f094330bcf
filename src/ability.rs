//! The queryable, read-only rule set.

use serde::Serialize;

use crate::authz::{evaluate, Authorizer};
use crate::errors::{AbilityError, AbilityResult};
use crate::models::{Args, Rule, SubjectRef};

/// An ordered, immutable collection of rules answering `can` / `cannot`.
///
/// Built once (usually through [`crate::define_ability_full`]) and then only
/// read, so it can be shared freely between threads.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ability {
    rules: Vec<Rule>,
}

impl Ability {
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules defined for exactly `action`, in definition order.
    pub fn rules_for<'a>(&'a self, action: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| rule.action() == action)
    }

    pub fn can<'s>(&self, action: &str, subject: impl Into<SubjectRef<'s>>) -> bool {
        self.can_with(action, subject, &Args::new())
    }

    pub fn can_with<'s>(
        &self,
        action: &str,
        subject: impl Into<SubjectRef<'s>>,
        args: &Args,
    ) -> bool {
        let subject = subject.into();
        let allowed = evaluate(self.rules_for(action), subject, args);
        tracing::debug!(action = %action, subject = %subject, allowed, "ability check");
        allowed
    }

    pub fn cannot<'s>(&self, action: &str, subject: impl Into<SubjectRef<'s>>) -> bool {
        !self.can(action, subject)
    }

    pub fn cannot_with<'s>(
        &self,
        action: &str,
        subject: impl Into<SubjectRef<'s>>,
        args: &Args,
    ) -> bool {
        !self.can_with(action, subject, args)
    }

    /// First rule for `action` whose subject tag is the subject's identity.
    pub fn relevant_rule_for<'s>(
        &self,
        action: &str,
        subject: impl Into<SubjectRef<'s>>,
    ) -> Option<&Rule> {
        let identity = subject.into().identity();
        self.rules
            .iter()
            .find(|rule| rule.action() == action && rule.subject() == identity)
    }

    /// `Ok(())` when `can` holds, otherwise `Forbidden` carrying the reason of
    /// the relevant denial rule, if any.
    pub fn authorize<'s>(&self, action: &str, subject: impl Into<SubjectRef<'s>>) -> AbilityResult<()> {
        self.authorize_with(action, subject, &Args::new())
    }

    pub fn authorize_with<'s>(
        &self,
        action: &str,
        subject: impl Into<SubjectRef<'s>>,
        args: &Args,
    ) -> AbilityResult<()> {
        let subject = subject.into();
        if self.can_with(action, subject, args) {
            return Ok(());
        }
        Err(AbilityError::forbidden(
            action,
            subject.identity(),
            self.denial_reason(action, subject),
        ))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Authorizer for Ability {
    fn permits(&self, action: &str, subject: SubjectRef<'_>, args: &Args) -> bool {
        self.can_with(action, subject, args)
    }

    fn denial_reason(&self, action: &str, subject: SubjectRef<'_>) -> Option<String> {
        let identity = subject.identity();
        self.rules_for(action)
            .filter(|rule| rule.is_inverted() && rule.subject() == identity)
            .find_map(|rule| rule.reason().map(str::to_string))
    }
}

impl FromIterator<Rule> for Ability {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, RuleOptions};

    fn rule(action: &str, subject: &str, inverted: bool) -> Rule {
        Rule::new(action, subject, RuleOptions::new(), inverted).unwrap()
    }

    #[test]
    fn filters_rules_by_exact_action() {
        let ability = Ability::new(vec![rule("read", "Article", false), rule("Read", "Book", false)]);
        assert!(ability.can("read", "Article"));
        assert!(!ability.can("read", "Book"));
        assert!(!ability.can("READ", "Article"));
        assert_eq!(ability.rules_for("read").count(), 1);
    }

    #[test]
    fn empty_ability_denies_everything() {
        let ability = Ability::default();
        assert!(ability.is_empty());
        assert!(!ability.can("read", "Article"));
        assert!(ability.cannot("read", "Article"));
    }

    #[test]
    fn cannot_negates_the_same_evaluation() {
        let ability = Ability::new(vec![rule("write", "Article", true)]);
        // The inverted rule validates every subject other than Article.
        assert!(ability.can("write", "Comment"));
        assert!(ability.cannot("write", "Article"));
        assert!(!ability.cannot("write", "Comment"));
    }

    #[test]
    fn relevant_rule_is_the_first_for_the_subject() {
        let ability = Ability::new(vec![
            rule("read", "Book", false),
            rule("read", "Article", true),
            rule("read", "Article", false),
        ]);
        let found = ability.relevant_rule_for("read", "Article").unwrap();
        assert!(found.is_inverted());
        assert!(ability.relevant_rule_for("read", "User").is_none());
    }

    #[test]
    fn authorize_reports_denial_reason() {
        let denial = Rule::new(
            "delete",
            "Article",
            RuleOptions::new().reason("articles are permanent"),
            true,
        )
        .unwrap();
        let ability = Ability::new(vec![denial]);
        let article = Record::new("Article");

        let err = ability.authorize("delete", &article).unwrap_err();
        assert_eq!(
            err,
            AbilityError::forbidden("delete", "Article", Some("articles are permanent".into()))
        );
        assert!(ability.authorize("delete", "Comment").is_ok());
    }

    #[test]
    fn serializes_rule_list() {
        let ability = Ability::new(vec![rule("read", "Article", false)]);
        let json = serde_json::to_value(&ability).unwrap();
        assert_eq!(json["rules"][0]["action"], "read");
        assert_eq!(json["rules"][0]["inverted"], false);
    }
}
