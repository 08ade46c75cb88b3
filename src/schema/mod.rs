//! Schema objects (spec component C6) and schema registries (C7).
//!
//! A schema object is built through a `*Builder`, then frozen into an
//! immutable value by [`SchemaManager::register_attribute_type`] and its
//! siblings, which resolve SUP chains, matching rules and syntaxes (Design
//! Notes §9: "builder → frozen-value split"). Once registered, an object
//! is never mutated in place; [`SchemaManager::unregister`]/`unload` are
//! the only ways to remove it.

pub mod attribute_type;
pub mod builtin;
pub mod dit;
pub mod matching_rule;
pub mod name_form;
pub mod object;
pub mod object_class;
pub mod parser;
pub mod registry;
pub mod syntax;

pub use attribute_type::{AttributeType, AttributeTypeBuilder, Usage};
pub use dit::{DitContentRule, DitStructureRule};
pub use matching_rule::{MatchingRule, MatchingRuleBuilder, MatchingRuleUse};
pub use name_form::NameForm;
pub use object::SchemaObject;
pub use object_class::{ObjectClass, ObjectClassBuilder, ObjectClassKind};
pub use registry::{Registry, SchemaManager, MAX_SUP_DEPTH};
pub use syntax::LdapSyntax;
