//! Schema registries and the [`SchemaManager`] (spec §4.7 "Schema
//! registries"): OID/name-indexed catalogs with dependency resolution and
//! the consistency checks of spec §4.7 rules 1–8.

use super::attribute_type::{AttributeType, AttributeTypeBuilder, Usage};
use super::dit::{DitContentRule, DitStructureRule};
use super::matching_rule::{MatchingRule, MatchingRuleBuilder, MatchingRuleUse};
use super::name_form::NameForm;
use super::object::{is_numeric_oid, SchemaObject};
use super::object_class::{ObjectClass, ObjectClassBuilder, ObjectClassKind};
use super::syntax::LdapSyntax;
use crate::error::LdapError;
use std::collections::{HashMap, HashSet};

/// SUP-closure walks are bounded by this many hops rather than recursion
/// depth alone (spec §5, DIRAPI-368: avoid unbounded recursion/stack
/// overflow on pathological inputs).
pub const MAX_SUP_DEPTH: usize = 128;

trait HasObject {
    fn schema_object(&self) -> &SchemaObject;
}
impl HasObject for AttributeType {
    fn schema_object(&self) -> &SchemaObject {
        &self.object
    }
}
impl HasObject for ObjectClass {
    fn schema_object(&self) -> &SchemaObject {
        &self.object
    }
}
impl HasObject for MatchingRule {
    fn schema_object(&self) -> &SchemaObject {
        &self.object
    }
}
impl HasObject for LdapSyntax {
    fn schema_object(&self) -> &SchemaObject {
        &self.object
    }
}
impl HasObject for NameForm {
    fn schema_object(&self) -> &SchemaObject {
        &self.object
    }
}
impl HasObject for MatchingRuleUse {
    fn schema_object(&self) -> &SchemaObject {
        &self.object
    }
}
impl HasObject for DitContentRule {
    fn schema_object(&self) -> &SchemaObject {
        &self.object
    }
}

/// An OID/descriptor-name indexed catalog of one schema object kind (spec
/// §3 "Registry"). Lookups are case-insensitive on names; OIDs compare
/// verbatim (they are ASCII digits/dots).
#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: Vec<T>,
    by_key: HashMap<String, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Registry {
            items: Vec::new(),
            by_key: HashMap::new(),
        }
    }
}

impl<T: HasObject> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.by_key.get(&key.to_ascii_lowercase()).map(|&i| &self.items[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Descriptor/OID keys this object would occupy.
    fn keys_for(obj: &SchemaObject) -> Vec<String> {
        let mut keys = vec![obj.oid.to_ascii_lowercase()];
        keys.extend(obj.names.iter().map(|n| n.to_ascii_lowercase()));
        keys
    }

    /// Insert, failing if any key (OID or descriptor name) is already
    /// taken within this registry (spec §4.7 rule 8).
    fn insert(&mut self, item: T) -> Result<(), LdapError> {
        let keys = Self::keys_for(item.schema_object());
        for k in &keys {
            if self.by_key.contains_key(k) {
                return Err(LdapError::SchemaViolation(format!(
                    "duplicate schema descriptor {k:?}"
                )));
            }
        }
        let idx = self.items.len();
        for k in keys {
            self.by_key.insert(k, idx);
        }
        self.items.push(item);
        Ok(())
    }

    fn remove_by_oid(&mut self, oid: &str) -> Option<T> {
        let idx = *self.by_key.get(&oid.to_ascii_lowercase())?;
        let removed = self.items.remove(idx);
        self.by_key.retain(|_, i| *i != idx);
        for v in self.by_key.values_mut() {
            if *v > idx {
                *v -= 1;
            }
        }
        Some(removed)
    }
}

/// The single mutable object in this crate's resource model (spec §5):
/// single-writer while under construction (enforced by `&mut self`),
/// many-reader once published (a locked manager is freely `Clone`/shared).
#[derive(Debug, Clone)]
pub struct SchemaManager {
    attribute_types: Registry<AttributeType>,
    object_classes: Registry<ObjectClass>,
    matching_rules: Registry<MatchingRule>,
    syntaxes: Registry<LdapSyntax>,
    name_forms: Registry<NameForm>,
    matching_rule_uses: Registry<MatchingRuleUse>,
    dit_content_rules: Registry<DitContentRule>,
    dit_structure_rules: HashMap<u32, DitStructureRule>,
    global_oids: HashMap<String, &'static str>,
    disabled_schemas: HashSet<String>,
    /// `true`: consistency violations are accumulated, not rejected
    /// (spec §4.7 "relaxed registry").
    pub relaxed: bool,
    pub errors: Vec<String>,
}

impl Default for SchemaManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaManager {
    /// An empty registry with no bootstrap schema loaded.
    pub fn empty() -> Self {
        SchemaManager {
            attribute_types: Registry::new(),
            object_classes: Registry::new(),
            matching_rules: Registry::new(),
            syntaxes: Registry::new(),
            name_forms: Registry::new(),
            matching_rule_uses: Registry::new(),
            dit_content_rules: Registry::new(),
            dit_structure_rules: HashMap::new(),
            global_oids: HashMap::new(),
            disabled_schemas: HashSet::new(),
            relaxed: false,
            errors: Vec::new(),
        }
    }

    /// Boots a manager with the core schema (`top`, `person`, … — spec
    /// §4.11 supplemental) loaded and enabled, the way a directory client
    /// library ships a default schema a caller can extend with `load`.
    pub fn new() -> Self {
        let mut mgr = Self::empty();
        super::builtin::bootstrap(&mut mgr).expect("bootstrap core schema is internally consistent");
        mgr
    }

    pub fn attribute_types(&self) -> &Registry<AttributeType> {
        &self.attribute_types
    }

    pub fn object_classes(&self) -> &Registry<ObjectClass> {
        &self.object_classes
    }

    pub fn matching_rules(&self) -> &Registry<MatchingRule> {
        &self.matching_rules
    }

    pub fn syntaxes(&self) -> &Registry<LdapSyntax> {
        &self.syntaxes
    }

    pub fn name_forms(&self) -> &Registry<NameForm> {
        &self.name_forms
    }

    fn claim_global_oid(&mut self, oid: &str, kind: &'static str) -> Result<(), LdapError> {
        if is_numeric_oid(oid) || self.relaxed {
            if let Some(existing) = self.global_oids.get(oid) {
                if *existing != kind {
                    let msg = format!("OID {oid} already registered as a {existing}");
                    return self.record_violation(msg);
                }
            }
            self.global_oids.insert(oid.to_string(), kind);
            Ok(())
        } else {
            self.record_violation(format!("OID {oid} is not dotted-decimal (strict mode)"))
        }
    }

    fn record_violation(&mut self, msg: String) -> Result<(), LdapError> {
        if self.relaxed {
            self.errors.push(msg);
            Ok(())
        } else {
            Err(LdapError::SchemaViolation(msg))
        }
    }

    /// Registers a matching rule (no SUP chain; matching rules don't
    /// inherit).
    pub fn register_matching_rule(&mut self, builder: MatchingRuleBuilder) -> Result<(), LdapError> {
        let mr = builder.build();
        if !self.syntaxes.is_empty() && self.syntaxes.get(&mr.syntax_oid).is_none() {
            self.record_violation(format!(
                "matching rule {} references unknown syntax {}",
                mr.object.oid, mr.syntax_oid
            ))?;
        }
        self.claim_global_oid(&mr.object.oid, "matchingRule")?;
        self.matching_rules.insert(mr)
    }

    pub fn register_syntax(&mut self, syntax: LdapSyntax) -> Result<(), LdapError> {
        self.claim_global_oid(&syntax.object.oid, "ldapSyntax")?;
        self.syntaxes.insert(syntax)
    }

    /// Resolves the SUP chain, picks the effective syntax/equality/
    /// ordering/substr, validates rules 1–4, and freezes the
    /// [`AttributeType`] (spec §4.7).
    pub fn register_attribute_type(&mut self, builder: AttributeTypeBuilder) -> Result<(), LdapError> {
        let AttributeTypeBuilder {
            object,
            sup,
            mut syntax_oid,
            syntax_length,
            mut equality,
            mut ordering,
            mut substr,
            single_value,
            collective,
            no_user_modification,
            usage,
        } = builder;

        if sup.is_none() && syntax_oid.is_none() {
            self.record_violation(format!(
                "attribute type {} has neither SUP nor SYNTAX",
                object.oid
            ))?;
        }

        let mut current = sup.clone();
        let mut hops = 0;
        while let Some(sup_key) = current {
            hops += 1;
            if hops > MAX_SUP_DEPTH {
                return Err(LdapError::NestingTooDeep);
            }
            match self.attribute_types.get(&sup_key) {
                Some(parent) => {
                    if syntax_oid.is_none() {
                        syntax_oid = parent.syntax_oid.clone();
                    }
                    if equality.is_none() {
                        equality = parent.equality.clone();
                    }
                    if ordering.is_none() {
                        ordering = parent.ordering.clone();
                    }
                    if substr.is_none() {
                        substr = parent.substr.clone();
                    }
                    current = parent.sup.clone();
                }
                None => {
                    self.record_violation(format!(
                        "attribute type {} has unresolved SUP {sup_key:?}",
                        object.oid
                    ))?;
                    break;
                }
            }
        }

        if no_user_modification && usage == Usage::UserApplications {
            self.record_violation(format!(
                "attribute type {}: NO-USER-MODIFICATION requires USAGE != userApplications",
                object.oid
            ))?;
        }
        if collective && usage != Usage::UserApplications {
            self.record_violation(format!(
                "attribute type {}: COLLECTIVE requires USAGE = userApplications",
                object.oid
            ))?;
        }

        let effective_syntax = syntax_oid.clone().unwrap_or_else(|| crate::syntaxes::syntax_oid::DIRECTORY_STRING.to_string());
        let human_readable = crate::syntaxes::is_human_readable(&effective_syntax);

        let normalizer = match equality.as_deref().and_then(|name| self.matching_rules.get(name)) {
            Some(mr) => crate::syntaxes::normalizer_for(mr.numeric_oid()),
            None => {
                if let Some(name) = equality.as_deref() {
                    self.record_violation(format!(
                        "attribute type {} references unresolved EQUALITY rule {name:?}",
                        object.oid
                    ))?;
                }
                crate::syntaxes::default_normalizer_for_syntax(&effective_syntax)
            }
        };

        self.claim_global_oid(&object.oid, "attributeType")?;
        let at = AttributeType {
            object,
            sup,
            syntax_oid: Some(effective_syntax),
            syntax_length,
            equality,
            ordering,
            substr,
            single_value,
            collective,
            no_user_modification,
            usage,
            human_readable,
            normalizer,
        };
        self.attribute_types.insert(at)
    }

    /// Walks the ObjectClass SUP closure bounded by [`MAX_SUP_DEPTH`],
    /// returning every ancestor kind (for rule 5's kind-compatibility
    /// check).
    fn object_class_closure_kinds(&mut self, sup: &[String]) -> Result<Vec<ObjectClassKind>, LdapError> {
        let mut kinds = Vec::new();
        let mut stack: Vec<(String, usize)> = sup.iter().map(|s| (s.clone(), 0)).collect();
        while let Some((name, depth)) = stack.pop() {
            if depth > MAX_SUP_DEPTH {
                return Err(LdapError::NestingTooDeep);
            }
            match self.object_classes.get(&name) {
                Some(oc) => {
                    kinds.push(oc.kind);
                    for s in &oc.sup {
                        stack.push((s.clone(), depth + 1));
                    }
                }
                None => {
                    self.record_violation(format!("object class SUP {name:?} does not resolve"))?;
                }
            }
        }
        Ok(kinds)
    }

    pub fn register_object_class(&mut self, builder: ObjectClassBuilder) -> Result<(), LdapError> {
        let oc = builder.build();
        let kinds = self.object_class_closure_kinds(&oc.sup)?;
        match oc.kind {
            ObjectClassKind::Structural => {
                if kinds.iter().any(|k| *k == ObjectClassKind::Auxiliary) {
                    self.record_violation(format!(
                        "STRUCTURAL object class {} has an AUXILIARY ancestor",
                        oc.object.oid
                    ))?;
                }
            }
            ObjectClassKind::Auxiliary => {
                if kinds.iter().any(|k| *k == ObjectClassKind::Structural) {
                    self.record_violation(format!(
                        "AUXILIARY object class {} has a STRUCTURAL ancestor",
                        oc.object.oid
                    ))?;
                }
            }
            ObjectClassKind::Abstract => {}
        }
        for attr in oc.must.iter().chain(oc.may.iter()) {
            if !self.attribute_types.is_empty() && self.attribute_types.get(attr).is_none() {
                self.record_violation(format!(
                    "object class {} references unknown attribute type {attr:?}",
                    oc.object.oid
                ))?;
            }
        }
        self.claim_global_oid(&oc.object.oid, "objectClass")?;
        self.object_classes.insert(oc)
    }

    pub fn register_name_form(&mut self, nf: NameForm) -> Result<(), LdapError> {
        for attr in &nf.must {
            if nf.may.contains(attr) {
                self.record_violation(format!(
                    "name form {}: {attr:?} is in both MUST and MAY",
                    nf.object.oid
                ))?;
            }
            if self.attribute_types.get(attr).is_none() {
                self.record_violation(format!(
                    "name form {} requires unknown attribute type {attr:?}",
                    nf.object.oid
                ))?;
            }
        }
        if self.object_classes.get(&nf.object_class).is_none() {
            self.record_violation(format!(
                "name form {} names unknown object class {:?}",
                nf.object.oid, nf.object_class
            ))?;
        }
        self.claim_global_oid(&nf.object.oid, "nameForm")?;
        self.name_forms.insert(nf)
    }

    pub fn register_matching_rule_use(&mut self, mru: MatchingRuleUse) -> Result<(), LdapError> {
        let rule_syntax = self.matching_rules.get(&mru.object.oid).map(|mr| mr.syntax_oid.clone());
        for attr in &mru.applies {
            match (self.attribute_types.get(attr), &rule_syntax) {
                (Some(at), Some(syn)) if at.syntax_oid.as_deref() != Some(syn.as_str()) => {
                    self.record_violation(format!(
                        "matchingRuleUse {} APPLIES {attr:?} whose syntax does not match the rule's SYNTAX",
                        mru.object.oid
                    ))?;
                }
                (None, _) => {
                    self.record_violation(format!(
                        "matchingRuleUse {} APPLIES unknown attribute type {attr:?}",
                        mru.object.oid
                    ))?;
                }
                _ => {}
            }
        }
        self.claim_global_oid(&mru.object.oid, "matchingRuleUse")?;
        self.matching_rule_uses.insert(mru)
    }

    pub fn register_dit_content_rule(&mut self, dcr: DitContentRule) -> Result<(), LdapError> {
        if self.object_classes.get(&dcr.structural_oc).is_none() {
            self.record_violation(format!(
                "DIT content rule {} governs unknown structural object class",
                dcr.object.oid
            ))?;
        }
        self.claim_global_oid(&dcr.object.oid, "ditContentRule")?;
        self.dit_content_rules.insert(dcr)
    }

    pub fn register_dit_structure_rule(&mut self, dsr: DitStructureRule) -> Result<(), LdapError> {
        if self.name_forms.get(&dsr.name_form).is_none() {
            self.record_violation(format!(
                "DIT structure rule {} names unknown name form {:?}",
                dsr.rule_id, dsr.name_form
            ))?;
        }
        self.dit_structure_rules.insert(dsr.rule_id, dsr);
        Ok(())
    }

    /// Removes every object belonging to `schema_name` entirely (spec §4.7
    /// `unload`), as opposed to [`SchemaManager::disable`] which merely
    /// hides them from lookups.
    pub fn unload(&mut self, schema_name: &str) {
        self.attribute_types.items.retain(|at| at.object.schema_name != schema_name);
        self.object_classes.items.retain(|oc| oc.object.schema_name != schema_name);
        self.matching_rules.items.retain(|mr| mr.object.schema_name != schema_name);
        self.syntaxes.items.retain(|s| s.object.schema_name != schema_name);
        self.name_forms.items.retain(|nf| nf.object.schema_name != schema_name);
        self.rebuild_indexes();
        self.disabled_schemas.remove(schema_name);
    }

    fn rebuild_indexes(&mut self) {
        fn reindex<T: HasObject>(reg: &mut Registry<T>) {
            reg.by_key.clear();
            for (i, item) in reg.items.iter().enumerate() {
                for k in Registry::<T>::keys_for(item.schema_object()) {
                    reg.by_key.insert(k, i);
                }
            }
        }
        reindex(&mut self.attribute_types);
        reindex(&mut self.object_classes);
        reindex(&mut self.matching_rules);
        reindex(&mut self.syntaxes);
        reindex(&mut self.name_forms);
    }

    /// Hides `schema_name`'s objects from lookups without discarding them
    /// (spec §4.7: "a schema with disabled state contributes no symbols to
    /// lookups").
    pub fn disable(&mut self, schema_name: &str) {
        self.disabled_schemas.insert(schema_name.to_string());
    }

    /// Re-enables `schema_name`, re-checking rules 1–8 (spec §4.7:
    /// "enabling re-checks (1)–(8); enabling a schema pulls its dependency
    /// closure transitively").
    pub fn enable(&mut self, schema_name: &str) -> Result<(), LdapError> {
        self.disabled_schemas.remove(schema_name);
        self.verify()
    }

    pub fn is_disabled(&self, schema_name: &str) -> bool {
        self.disabled_schemas.contains(schema_name)
    }

    /// Unregister a single object by OID from whichever per-kind registry
    /// holds it.
    pub fn unregister(&mut self, oid: &str) -> Result<(), LdapError> {
        if self.attribute_types.remove_by_oid(oid).is_some()
            || self.object_classes.remove_by_oid(oid).is_some()
            || self.matching_rules.remove_by_oid(oid).is_some()
            || self.syntaxes.remove_by_oid(oid).is_some()
            || self.name_forms.remove_by_oid(oid).is_some()
        {
            self.global_oids.remove(oid);
            Ok(())
        } else {
            Err(LdapError::UnsupportedOperation(format!("no schema object with OID {oid}")))
        }
    }

    /// Re-runs consistency rules 1–8 over everything currently registered
    /// (spec §8 "Schema consistency": "in strict mode, every successful
    /// load leaves the registry satisfying rules 1–8").
    pub fn verify(&self) -> Result<(), LdapError> {
        let mut violations = Vec::new();
        for at in self.attribute_types.iter() {
            if let Some(sup) = &at.sup {
                if self.attribute_types.get(sup).is_none() {
                    violations.push(format!("attribute type {} SUP {sup:?} unresolved", at.object.oid));
                }
            }
        }
        for oc in self.object_classes.iter() {
            for sup in &oc.sup {
                if self.object_classes.get(sup).is_none() {
                    violations.push(format!("object class {} SUP {sup:?} unresolved", oc.object.oid));
                }
            }
        }
        if violations.is_empty() {
            Ok(())
        } else if self.relaxed {
            Ok(())
        } else {
            Err(LdapError::SchemaViolations(violations))
        }
    }
}
