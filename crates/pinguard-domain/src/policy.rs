use crate::extract::cuts_value;
use crate::model::{DOCKER_PREFIX, Decision, Evaluation, LOCAL_PREFIX, Reference, Replacement};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowEntry {
    pub identity: String,
    pub tag: String,
    pub hash: Option<String>,
}

impl AllowEntry {
    pub fn tag(identity: &str, tag: &str) -> Self {
        Self {
            identity: identity.to_string(),
            tag: tag.to_string(),
            hash: None,
        }
    }

    pub fn hash(identity: &str, tag: &str, hash: &str) -> Self {
        Self {
            identity: identity.to_string(),
            tag: tag.to_string(),
            hash: Some(hash.to_string()),
        }
    }

    /// The revision a reference must be pinned to.
    ///
    /// A non-empty hash is authoritative; the tag is then only a display annotation.
    pub fn required_pin(&self) -> Replacement {
        match self.hash.as_deref().filter(|h| !h.is_empty()) {
            Some(hash) => Replacement {
                revision: hash.to_string(),
                display_tag: Some(self.tag.clone()).filter(|t| !t.is_empty()),
            },
            None => Replacement {
                revision: self.tag.clone(),
                display_tag: None,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenyEntry {
    pub identity: String,
    pub reason: String,
}

impl DenyEntry {
    pub fn new(identity: &str, reason: &str) -> Self {
        Self {
            identity: identity.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy entry has an empty identity")]
    EmptyIdentity,
    #[error("allowed identity `{0}` has neither a tag nor a hash")]
    MissingPin(String),
    #[error("allowed identity `{0}` is listed more than once")]
    DuplicateAllow(String),
    #[error("denied identity `{0}` is listed more than once")]
    DuplicateDeny(String),
    #[error("identity `{0}` can never match a reference")]
    InvalidIdentity(String),
    #[error("allowed identity `{0}` has a pin that cannot be written as a single value")]
    InvalidPin(String),
}

/// An identity must be something `Reference::parse` can produce from a scanned value.
fn valid_identity(identity: &str) -> bool {
    !identity.contains('@')
        && !identity.starts_with(LOCAL_PREFIX)
        && !identity.starts_with(DOCKER_PREFIX)
        && !identity.contains(cuts_value)
}

/// A pin written by the rewriter must scan back as the same value.
fn valid_pin(revision: &str) -> bool {
    !revision.is_empty() && !revision.contains(cuts_value)
}

/// Immutable allow/deny tables. Built once per run and shared read-only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Policy {
    allowed: BTreeMap<String, AllowEntry>,
    denied: BTreeMap<String, String>,
}

impl Policy {
    pub fn new(
        allow: impl IntoIterator<Item = AllowEntry>,
        deny: impl IntoIterator<Item = DenyEntry>,
    ) -> Result<Self, PolicyError> {
        let mut allowed = BTreeMap::new();
        for entry in allow {
            if entry.identity.trim().is_empty() {
                return Err(PolicyError::EmptyIdentity);
            }
            if !valid_identity(&entry.identity) {
                return Err(PolicyError::InvalidIdentity(entry.identity));
            }
            let has_hash = entry.hash.as_deref().is_some_and(|h| !h.is_empty());
            if entry.tag.is_empty() && !has_hash {
                return Err(PolicyError::MissingPin(entry.identity));
            }
            // The display tag lands in a trailing comment, so only line breaks are fatal there.
            let pin = entry.required_pin();
            let tag_breaks_line = pin.display_tag.is_some_and(|t| t.contains(['\n', '\r']));
            if !valid_pin(&pin.revision) || tag_breaks_line {
                return Err(PolicyError::InvalidPin(entry.identity));
            }
            if allowed.contains_key(&entry.identity) {
                return Err(PolicyError::DuplicateAllow(entry.identity));
            }
            allowed.insert(entry.identity.clone(), entry);
        }

        let mut denied = BTreeMap::new();
        for entry in deny {
            if entry.identity.trim().is_empty() {
                return Err(PolicyError::EmptyIdentity);
            }
            if !valid_identity(&entry.identity) {
                return Err(PolicyError::InvalidIdentity(entry.identity));
            }
            if denied.contains_key(&entry.identity) {
                return Err(PolicyError::DuplicateDeny(entry.identity));
            }
            denied.insert(entry.identity, entry.reason);
        }

        Ok(Self { allowed, denied })
    }

    pub fn allowed(&self) -> impl Iterator<Item = &AllowEntry> {
        self.allowed.values()
    }

    pub fn denied(&self) -> impl Iterator<Item = (&str, &str)> {
        self.denied.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn allow_entry(&self, identity: &str) -> Option<&AllowEntry> {
        self.allowed.get(identity)
    }

    pub fn deny_reason(&self, identity: &str) -> Option<&str> {
        self.denied.get(identity).map(String::as_str)
    }

    /// Identities present in both tables. They always evaluate to DENIED.
    pub fn overlapping(&self) -> Vec<&str> {
        self.allowed
            .keys()
            .filter(|id| self.denied.contains_key(*id))
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty() && self.denied.is_empty()
    }

    /// Decide what to do with one raw reference expression.
    pub fn evaluate(&self, raw: &str) -> Evaluation {
        if raw.starts_with(LOCAL_PREFIX) || raw.starts_with(DOCKER_PREFIX) {
            return Evaluation::Skip;
        }

        let Some(reference) = Reference::parse(raw) else {
            return Evaluation::Decided(Decision::Malformed {
                raw: raw.to_string(),
            });
        };

        if let Some(reason) = self.deny_reason(&reference.identity) {
            return Evaluation::Decided(Decision::Denied {
                reason: reason.to_string(),
                reference,
            });
        }

        let Some(entry) = self.allow_entry(&reference.identity) else {
            return Evaluation::Decided(Decision::Unknown { reference });
        };

        let replacement = entry.required_pin();
        if replacement.revision == reference.revision {
            Evaluation::Decided(Decision::Ok { reference })
        } else {
            Evaluation::Decided(Decision::Replace {
                reference,
                replacement,
            })
        }
    }
}
