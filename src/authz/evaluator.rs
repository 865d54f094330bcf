use crate::models::{Args, Rule, SubjectRef};

/// Answers "is `action` permitted on `subject`?".
///
/// `forbids` is defined in terms of `permits`, so implementors only decide
/// grants and the two can never disagree.
pub trait Authorizer: Send + Sync {
    fn permits(&self, action: &str, subject: SubjectRef<'_>, args: &Args) -> bool;

    fn forbids(&self, action: &str, subject: SubjectRef<'_>, args: &Args) -> bool {
        !self.permits(action, subject, args)
    }

    /// Human-readable explanation attached to a denial, if one is known.
    fn denial_reason(&self, _action: &str, _subject: SubjectRef<'_>) -> Option<String> {
        None
    }
}

impl<A: Authorizer + ?Sized> Authorizer for &A {
    fn permits(&self, action: &str, subject: SubjectRef<'_>, args: &Args) -> bool {
        (**self).permits(action, subject, args)
    }

    fn denial_reason(&self, action: &str, subject: SubjectRef<'_>) -> Option<String> {
        (**self).denial_reason(action, subject)
    }
}

/// Evaluate rules of a single action in definition order.
///
/// The first rule whose [`Rule::valid`] holds decides: the result is `true`.
/// Later rules are not consulted. No rules, or no valid rule, yields `false`.
pub fn evaluate<'r, I>(rules: I, subject: SubjectRef<'_>, args: &Args) -> bool
where
    I: IntoIterator<Item = &'r Rule>,
{
    for rule in rules {
        if rule.valid(subject, args) {
            tracing::trace!(
                action = %rule.action(),
                rule_subject = %rule.subject(),
                inverted = rule.is_inverted(),
                subject = %subject,
                "rule matched"
            );
            return true;
        }
    }

    tracing::trace!(subject = %subject, "no rule matched");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, RuleOptions};

    fn rule(action: &str, subject: &str, options: RuleOptions, inverted: bool) -> Rule {
        Rule::new(action, subject, options, inverted).unwrap()
    }

    #[test]
    fn empty_rule_set_denies() {
        assert!(!evaluate(&[], "Article".into(), &Args::new()));
    }

    #[test]
    fn any_valid_rule_permits() {
        let rules = vec![
            rule("read", "Book", RuleOptions::new(), false),
            rule("read", "Article", RuleOptions::new(), false),
        ];
        assert!(evaluate(&rules, "Article".into(), &Args::new()));
        assert!(!evaluate(&rules, "Comment".into(), &Args::new()));
    }

    #[test]
    fn first_match_wins_over_a_later_denial() {
        let draft = Record::new("Article").with_field("published", false);
        let rules = vec![
            rule("read", "Article", RuleOptions::new(), false),
            rule("read", "Article", RuleOptions::new().field("published", false), true),
        ];
        assert!(evaluate(&rules, SubjectRef::from(&draft), &Args::new()));
    }

    #[test]
    fn evaluation_stops_at_first_valid_rule() {
        let rules = vec![
            rule("read", "Article", RuleOptions::new(), false),
            rule(
                "read",
                "Article",
                RuleOptions::new().condition(|_, _| panic!("should not be evaluated")),
                false,
            ),
        ];
        assert!(evaluate(&rules, "Article".into(), &Args::new()));
    }

    #[test]
    #[should_panic(expected = "condition blew up")]
    fn panicking_condition_propagates() {
        let rules = vec![rule(
            "read",
            "Article",
            RuleOptions::new().condition(|_, _| panic!("condition blew up")),
            false,
        )];
        evaluate(&rules, "Article".into(), &Args::new());
    }

    struct AllowAll;

    impl Authorizer for AllowAll {
        fn permits(&self, _action: &str, _subject: SubjectRef<'_>, _args: &Args) -> bool {
            true
        }
    }

    #[test]
    fn forbids_is_the_negation_of_permits() {
        let authorizer = AllowAll;
        assert!(authorizer.permits("anything", "At.All".into(), &Args::new()));
        assert!(!authorizer.forbids("anything", "At.All".into(), &Args::new()));
        assert!(!(&authorizer).forbids("anything", "At.All".into(), &Args::new()));
        assert_eq!(authorizer.denial_reason("anything", "At.All".into()), None);
    }
}
