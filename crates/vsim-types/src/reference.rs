//! Entity references and the reference parser.
//!
//! An [`EntityReference`] is the opaque `{kind, id}` pair every client and
//! every inventory edge uses to name a simulated object. References are
//! immutable values; two references are equal when both parts are equal.
//!
//! [`reference_from_string`] decodes the free-form identifiers clients send:
//!
//! 1. `Kind:ID` where `Kind` looks like a kind token,
//! 2. a bare ID whose prefix implies a kind (`domain-c2`, `group-p2`, ...),
//! 3. any other bare ID, which names a virtual machine.
//!
//! # Example
//!
//! ```
//! use vsim_types::{reference_from_string, EntityKind, EntityReference};
//!
//! let cluster = reference_from_string("domain-c7").unwrap();
//! assert_eq!(cluster, EntityReference::of(EntityKind::ClusterComputeResource, "domain-c7"));
//!
//! assert!(reference_from_string("no:no").is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::kind::EntityKind;

/// Identity of one simulated entity: a kind name plus an identifier.
///
/// The kind is kept as a string rather than an [`EntityKind`] so that
/// references to kinds the simulator does not model can still be parsed and
/// rejected later with a typed fault.
///
/// A reference whose `id` is empty is *unset*; the inventory assigns a fresh
/// identifier when such an entity is inserted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    kind: String,
    id: String,
}

impl EntityReference {
    /// Creates a reference from a raw kind token and identifier.
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a reference to an entity of a known kind.
    #[must_use]
    pub fn of(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::new(kind.as_str(), id)
    }

    /// Creates an unset reference of the given kind.
    #[must_use]
    pub fn unset(kind: EntityKind) -> Self {
        Self::new(kind.as_str(), "")
    }

    /// Returns the kind token.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the kind if it is one the simulator knows.
    #[must_use]
    pub fn known_kind(&self) -> Option<EntityKind> {
        self.kind.parse().ok()
    }

    /// Returns true if the reference has no identifier yet.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.id.is_empty()
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Error returned by the strict `Kind:ID` parser ([`FromStr`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed entity reference: {0:?}")]
pub struct ParseReferenceError(pub String);

impl FromStr for EntityReference {
    type Err = ParseReferenceError;

    /// Parses exactly the explicit `Kind:ID` form.
    ///
    /// Use [`reference_from_string`] to also accept bare identifiers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((kind, id)) if is_kind_token(kind) && !id.is_empty() => Ok(Self::new(kind, id)),
            _ => Err(ParseReferenceError(s.to_string())),
        }
    }
}

// =============================================================================
// Reference Parser
// =============================================================================

/// Decodes an external identifier into a reference.
///
/// Pure: the result depends on `s` alone. Returns `None` when nothing
/// sensible can be derived, which callers report as "not found"; whether
/// the kind actually exists is checked later by the registry.
///
/// # Precedence
///
/// 1. `Kind:ID` with a syntactically valid kind token (an ASCII uppercase
///    letter followed by ASCII alphanumerics) and a non-empty ID.
/// 2. A two-token string with an invalid kind token only matches when its
///    right side carries one of the kind-implying prefixes.
/// 3. A bare ID with a kind-implying prefix gets that kind.
/// 4. Any other non-empty bare ID is a `VirtualMachine`.
#[must_use]
pub fn reference_from_string(s: &str) -> Option<EntityReference> {
    if s.is_empty() {
        return None;
    }

    if let Some((kind, id)) = s.split_once(':') {
        if is_kind_token(kind) && !id.is_empty() {
            return Some(EntityReference::new(kind, id));
        }
        return kind_from_id(id).map(|kind| EntityReference::of(kind, id));
    }

    let kind = kind_from_id(s).unwrap_or(EntityKind::VirtualMachine);
    Some(EntityReference::of(kind, s))
}

/// Returns the kind implied by an identifier's structural prefix, if any.
///
/// The prefix is everything before the first `-`. `domain`, `group` and
/// `resgroup` are further split on the first character after the dash.
#[must_use]
pub fn kind_from_id(id: &str) -> Option<EntityKind> {
    let (head, tail) = id.split_once('-')?;
    let marker = tail.chars().next();

    match head {
        "domain" => match marker {
            Some('c') => Some(EntityKind::ClusterComputeResource),
            Some('s') => Some(EntityKind::ComputeResource),
            _ => None,
        },
        "group" => match marker {
            Some('p') => Some(EntityKind::StoragePod),
            Some(_) => Some(EntityKind::Folder),
            None => None,
        },
        "resgroup" => match marker {
            Some('v') => Some(EntityKind::VirtualApp),
            _ => Some(EntityKind::ResourcePool),
        },
        "datacenter" => Some(EntityKind::Datacenter),
        "host" => Some(EntityKind::HostSystem),
        "datastore" => Some(EntityKind::Datastore),
        "network" => Some(EntityKind::Network),
        "dvs" => Some(EntityKind::DistributedVirtualSwitch),
        "dvportgroup" => Some(EntityKind::DistributedVirtualPortgroup),
        "vm" => Some(EntityKind::VirtualMachine),
        "task" => Some(EntityKind::Task),
        _ => None,
    }
}

fn is_kind_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference(kind: &str, id: &str) -> Option<EntityReference> {
        Some(EntityReference::new(kind, id))
    }

    mod parser_tests {
        use super::*;

        #[test]
        fn reference_from_string_table() {
            let tests = [
                ("no:no", None),
                ("Datacenter:yes", reference("Datacenter", "yes")),
                ("datacenter-yes", reference("Datacenter", "datacenter-yes")),
                ("VirtualMachine:vm-2", reference("VirtualMachine", "vm-2")),
                ("vm-2", reference("VirtualMachine", "vm-2")),
                ("domain-s2", reference("ComputeResource", "domain-s2")),
                ("domain-c2", reference("ClusterComputeResource", "domain-c2")),
                ("group-d1", reference("Folder", "group-d1")),
                ("group-p2", reference("StoragePod", "group-p2")),
                ("resgroup-42", reference("ResourcePool", "resgroup-42")),
                ("resgroup-v32", reference("VirtualApp", "resgroup-v32")),
            ];

            for (input, expected) in tests {
                assert_eq!(reference_from_string(input), expected, "input {input:?}");
            }
        }

        #[test]
        fn empty_string_has_no_match() {
            assert_eq!(reference_from_string(""), None);
        }

        #[test]
        fn explicit_kind_is_not_validated() {
            // Existence of the kind is checked by the registry, not here.
            assert_eq!(
                reference_from_string("Spaceship:ss-1"),
                reference("Spaceship", "ss-1")
            );
        }

        #[test]
        fn explicit_kind_requires_an_id() {
            assert_eq!(reference_from_string("Datacenter:"), None);
        }

        #[test]
        fn invalid_kind_token_falls_back_to_prefix_of_right_side() {
            assert_eq!(
                reference_from_string("cluster:domain-c9"),
                reference("ClusterComputeResource", "domain-c9")
            );
            assert_eq!(reference_from_string("cluster:c9"), None);
        }

        #[test]
        fn other_bare_ids_are_virtual_machines() {
            assert_eq!(
                reference_from_string("42"),
                reference("VirtualMachine", "42")
            );
            assert_eq!(
                reference_from_string("domain-x1"),
                reference("VirtualMachine", "domain-x1")
            );
        }

        #[test]
        fn minted_prefixes_round_trip() {
            for kind in EntityKind::ALL {
                let id = format!("{}17", kind.id_prefix());
                let parsed = reference_from_string(&id).unwrap();
                let expected = if kind == EntityKind::OpaqueNetwork {
                    EntityKind::Network
                } else {
                    kind
                };
                assert_eq!(parsed.known_kind(), Some(expected), "id {id}");
            }
        }
    }

    mod strict_parse_tests {
        use super::*;

        #[test]
        fn from_str_accepts_explicit_form() {
            let parsed: EntityReference = "HostSystem:host-3".parse().unwrap();
            assert_eq!(parsed, EntityReference::of(EntityKind::HostSystem, "host-3"));
            assert_eq!(parsed.to_string(), "HostSystem:host-3");
        }

        #[test]
        fn from_str_rejects_bare_ids() {
            assert!("host-3".parse::<EntityReference>().is_err());
            assert!("no:no".parse::<EntityReference>().is_err());
        }
    }

    proptest! {
        #[test]
        fn parser_is_deterministic(s in ".{0,24}") {
            prop_assert_eq!(reference_from_string(&s), reference_from_string(&s));
        }

        #[test]
        fn explicit_form_preserves_both_parts(
            kind in "[A-Z][A-Za-z0-9]{0,20}",
            id in "[a-z0-9-]{1,12}",
        ) {
            let parsed = reference_from_string(&format!("{kind}:{id}"));
            prop_assert_eq!(parsed, Some(EntityReference::new(kind, id)));
        }

        #[test]
        fn bare_ids_always_match(id in "[a-z0-9][a-z0-9-]{0,16}") {
            let parsed = reference_from_string(&id).unwrap();
            prop_assert_eq!(parsed.id(), id.as_str());
        }
    }
}
