//! Bootstrap core schema (spec §4.11 supplemental): `top`, `alias`,
//! `extensibleObject`, `person`, `organizationalPerson`, `inetOrgPerson`,
//! `organizationalUnit`, `dcObject`/`domain`, `groupOfNames`, loaded at
//! [`SchemaManager::new`] time the way a directory client library ships a
//! default schema a caller can extend with `load`.
//!
//! Syntaxes and matching rules are registered directly through their
//! builders (they have no RFC 4512 textual form of their own — real
//! directory servers hardcode these rather than load them from a schema
//! file); attribute types and object classes are expressed as RFC 4512
//! descriptions and parsed with [`super::parser`], exercising the same
//! path a caller's `load()` call would use.

use super::matching_rule::MatchingRuleBuilder;
use super::parser::{parse_attribute_type, parse_object_class, MacroTable};
use super::registry::SchemaManager;
use super::syntax::LdapSyntax;
use crate::error::LdapError;
use crate::syntaxes::{matching_rule_oid as mr, syntax_oid as syn};

const SCHEMA_NAME: &str = "core";

fn register_syntaxes(mgr: &mut SchemaManager) -> Result<(), LdapError> {
    for oid in [
        syn::BOOLEAN,
        syn::DIRECTORY_STRING,
        syn::DN,
        syn::GENERALIZED_TIME,
        syn::IA5_STRING,
        syn::INTEGER,
        syn::JPEG,
        syn::NUMERIC_STRING,
        syn::OCTET_STRING,
        syn::OID,
        syn::POSTAL_ADDRESS,
        syn::TELEPHONE_NUMBER,
        syn::NAME_AND_OPTIONAL_UID,
        syn::BIT_STRING,
        syn::CERTIFICATE,
        syn::CERTIFICATE_LIST,
        syn::CERTIFICATE_PAIR,
        syn::COUNTRY_STRING,
        syn::PRINTABLE_STRING,
        syn::TELEX_NUMBER,
        syn::SUBSTRING_ASSERTION,
    ] {
        let human_readable = crate::syntaxes::is_human_readable(oid);
        mgr.register_syntax(LdapSyntax::new(oid, human_readable))?;
    }
    Ok(())
}

fn register_matching_rules(mgr: &mut SchemaManager) -> Result<(), LdapError> {
    let rules: &[(&str, &str, &str)] = &[
        (mr::OBJECT_IDENTIFIER_MATCH, "objectIdentifierMatch", syn::OID),
        (mr::DISTINGUISHED_NAME_MATCH, "distinguishedNameMatch", syn::DN),
        (mr::CASE_IGNORE_MATCH, "caseIgnoreMatch", syn::DIRECTORY_STRING),
        (mr::CASE_IGNORE_ORDERING_MATCH, "caseIgnoreOrderingMatch", syn::DIRECTORY_STRING),
        (mr::CASE_IGNORE_SUBSTRINGS_MATCH, "caseIgnoreSubstringsMatch", syn::SUBSTRING_ASSERTION),
        (mr::CASE_EXACT_MATCH, "caseExactMatch", syn::DIRECTORY_STRING),
        (mr::CASE_EXACT_ORDERING_MATCH, "caseExactOrderingMatch", syn::DIRECTORY_STRING),
        (mr::CASE_EXACT_SUBSTRINGS_MATCH, "caseExactSubstringsMatch", syn::SUBSTRING_ASSERTION),
        (mr::NUMERIC_STRING_MATCH, "numericStringMatch", syn::NUMERIC_STRING),
        (mr::NUMERIC_STRING_SUBSTRINGS_MATCH, "numericStringSubstringsMatch", syn::SUBSTRING_ASSERTION),
        (mr::BOOLEAN_MATCH, "booleanMatch", syn::BOOLEAN),
        (mr::INTEGER_MATCH, "integerMatch", syn::INTEGER),
        (mr::BIT_STRING_MATCH, "bitStringMatch", syn::BIT_STRING),
        (mr::OCTET_STRING_MATCH, "octetStringMatch", syn::OCTET_STRING),
        (mr::TELEPHONE_NUMBER_MATCH, "telephoneNumberMatch", syn::TELEPHONE_NUMBER),
        (mr::GENERALIZED_TIME_MATCH, "generalizedTimeMatch", syn::GENERALIZED_TIME),
        (mr::GENERALIZED_TIME_ORDERING_MATCH, "generalizedTimeOrderingMatch", syn::GENERALIZED_TIME),
        (mr::OBJECT_IDENTIFIER_FIRST_COMPONENT_MATCH, "objectIdentifierFirstComponentMatch", syn::OID),
        (mr::CASE_IGNORE_IA5_MATCH, "caseIgnoreIA5Match", syn::IA5_STRING),
        (mr::CASE_EXACT_IA5_MATCH, "caseExactIA5Match", syn::IA5_STRING),
    ];
    for (oid, name, syntax) in rules {
        mgr.register_matching_rule(
            MatchingRuleBuilder::new(*oid, *syntax).name(*name).schema_name(SCHEMA_NAME),
        )?;
    }
    Ok(())
}

// Ordered so every SUP reference names an already-registered attribute
// type — `register_attribute_type` resolves SUP eagerly, not in a
// separate fixpoint pass.
const CORE_ATTRIBUTE_TYPES: &[&str] = &[
    "( 2.5.4.0 NAME 'objectClass' EQUALITY objectIdentifierMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.38 )",
    "( 2.5.4.41 NAME 'name' EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{32768} )",
    "( 2.5.4.3 NAME 'cn' SUP name )",
    "( 2.5.4.4 NAME 'sn' SUP name )",
    "( 2.5.4.6 NAME 'c' SUP name SINGLE-VALUE )",
    "( 2.5.4.7 NAME 'l' SUP name )",
    "( 2.5.4.10 NAME 'o' SUP name )",
    "( 2.5.4.11 NAME 'ou' SUP name )",
    "( 2.5.4.12 NAME 'title' SUP name )",
    "( 2.5.4.13 NAME 'description' EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{1024} )",
    "( 2.5.4.20 NAME 'telephoneNumber' EQUALITY telephoneNumberMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.50{32} )",
    "( 2.5.4.16 NAME 'postalAddress' EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.41{256} )",
    "( 2.5.4.35 NAME 'userPassword' EQUALITY octetStringMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.40{128} )",
    "( 2.5.4.49 NAME 'distinguishedName' EQUALITY distinguishedNameMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.12 )",
    "( 2.5.4.34 NAME 'seeAlso' SUP distinguishedName )",
    "( 2.5.4.31 NAME 'member' SUP distinguishedName )",
    "( 0.9.2342.19200300.100.1.1 NAME 'uid' EQUALITY caseIgnoreMatch SUBSTR caseIgnoreSubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{256} )",
    "( 0.9.2342.19200300.100.1.3 NAME 'mail' EQUALITY caseIgnoreIA5Match SUBSTR caseIgnoreIA5SubstringsMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.26{256} )",
    "( 0.9.2342.19200300.100.1.25 NAME 'dc' EQUALITY caseIgnoreIA5Match SUBSTR caseIgnoreIA5SubstringsMatch SINGLE-VALUE SYNTAX 1.3.6.1.4.1.1466.115.121.1.15{128} )",
];

const CORE_OBJECT_CLASSES: &[&str] = &[
    "( 2.5.6.0 NAME 'top' ABSTRACT MUST objectClass )",
    "( 2.5.6.1 NAME 'alias' SUP top STRUCTURAL MUST aliasedObjectName )",
    "( 1.3.6.1.4.1.1466.101.120.111 NAME 'extensibleObject' SUP top AUXILIARY )",
    "( 2.5.6.6 NAME 'person' SUP top STRUCTURAL MUST ( sn $ cn ) MAY ( userPassword $ telephoneNumber $ seeAlso $ description ) )",
    "( 2.5.6.7 NAME 'organizationalPerson' SUP person STRUCTURAL MAY ( title $ ou $ l ) )",
    "( 2.16.840.1.113730.3.2.2 NAME 'inetOrgPerson' SUP organizationalPerson STRUCTURAL MAY ( mail $ uid ) )",
    "( 2.5.6.5 NAME 'organizationalUnit' SUP top STRUCTURAL MUST ou MAY ( description $ seeAlso ) )",
    "( 1.3.6.1.4.1.1466.344 NAME 'dcObject' SUP top AUXILIARY MUST dc )",
    "( 0.9.2342.19200300.100.4.13 NAME 'domain' SUP top STRUCTURAL MUST dc MAY ( description $ o ) )",
    "( 2.5.6.9 NAME 'groupOfNames' SUP top STRUCTURAL MUST ( cn $ member ) MAY description )",
];

/// `aliasedObjectName` is needed by `alias` above but has no equality
/// matching rule of its own in RFC 4512 (it reuses distinguishedNameMatch
/// via SUP).
const EXTRA_ATTRIBUTE_TYPES: &[&str] = &[
    "( 2.5.4.1 NAME 'aliasedObjectName' SUP distinguishedName SINGLE-VALUE )",
];

pub(crate) fn bootstrap(mgr: &mut SchemaManager) -> Result<(), LdapError> {
    register_syntaxes(mgr)?;
    register_matching_rules(mgr)?;

    let macros = MacroTable::new();
    for desc in CORE_ATTRIBUTE_TYPES {
        let builder = parse_attribute_type(desc, &macros, false)?.schema_name(SCHEMA_NAME);
        mgr.register_attribute_type(builder)?;
    }
    for desc in EXTRA_ATTRIBUTE_TYPES {
        let builder = parse_attribute_type(desc, &macros, false)?.schema_name(SCHEMA_NAME);
        mgr.register_attribute_type(builder)?;
    }
    for desc in CORE_OBJECT_CLASSES {
        let builder = parse_object_class(desc, &macros, false)?.schema_name(SCHEMA_NAME);
        mgr.register_object_class(builder)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_resolves_cn_and_person() {
        let mgr = SchemaManager::new();
        let cn = mgr.attribute_types().get("cn").expect("cn registered");
        assert_eq!(cn.numeric_oid(), "2.5.4.3");
        assert!(cn.syntax_is_human_readable());
        let person = mgr.object_classes().get("person").expect("person registered");
        assert!(person.must.contains(&"sn".to_string()));
    }

    #[test]
    fn bootstrap_is_internally_consistent() {
        let mgr = SchemaManager::new();
        mgr.verify().expect("core schema satisfies rules 1-8");
    }
}
