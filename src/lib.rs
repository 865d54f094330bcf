//! Rule-based authorization.
//!
//! Describe what a user *can* and *cannot* do as an ordered list of rules,
//! then ask the resulting [`Ability`] whether an action is permitted on a
//! subject. A subject is a tag (`"Article"`), a type descriptor
//! (`SubjectRef::of::<Article>()`), or a live value implementing [`Subject`].
//!
//! ```
//! use casl::{define_ability_full, Record, RuleOptions};
//!
//! let ability = define_ability_full(|can, cannot| {
//!     can.can_with("read", "Article", RuleOptions::new().field("published", true))?;
//!     cannot.cannot("delete", "Article")?;
//!     Ok(())
//! })?;
//!
//! let draft = Record::new("Article").with_field("published", false);
//! assert!(ability.cannot("read", &draft));
//! # Ok::<(), casl::AbilityError>(())
//! ```

pub mod ability;
pub mod authz;
pub mod builder;
pub mod errors;
pub mod models;

// Re-export commonly used items
pub use ability::Ability;
pub use authz::{evaluate, Authorizer, EnforcementMode, Guard};
pub use builder::{
    define_ability_full, define_ability_permit_only, AbilityBuilder, Actions, Forbid, Permit,
    Subjects,
};
pub use errors::{AbilityError, AbilityResult};
pub use models::{
    normalize_subject, normalize_subject_value, Args, Condition, Fields, Record, Rule,
    RuleOptions, Subject, SubjectName, SubjectRef, SubjectType,
};
