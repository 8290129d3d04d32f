use std::fmt;

/// Prefix of a reference to a component inside the same repository.
pub const LOCAL_PREFIX: &str = "./";

/// Prefix of a reference to a container image rather than a repository component.
pub const DOCKER_PREFIX: &str = "docker://";

/// A parsed `identity@revision` reference expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Slash-delimited component path, e.g. `actions/checkout` or `org/repo/sub/dir`.
    pub identity: String,
    /// Tag or content hash currently pinned.
    pub revision: String,
}

impl Reference {
    /// Split on the first `@`. Both halves must be non-empty.
    ///
    /// A quote anywhere in the expression is left over from an unterminated quoted value.
    pub fn parse(raw: &str) -> Option<Reference> {
        if raw.contains(['"', '\'']) {
            return None;
        }
        let (identity, revision) = raw.split_once('@')?;
        if identity.is_empty() || revision.is_empty() {
            return None;
        }
        Some(Reference {
            identity: identity.to_string(),
            revision: revision.to_string(),
        })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.identity, self.revision)
    }
}

/// The pin a REPLACE decision rewrites to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    pub revision: String,
    /// Human-readable tag written as a trailing annotation next to a hash pin.
    pub display_tag: Option<String>,
}

impl Replacement {
    pub fn expression(&self, identity: &str) -> String {
        format!("{identity}@{}", self.revision)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Pin already matches policy.
    Ok { reference: Reference },
    /// Pin differs from the policy's preferred pin.
    Replace {
        reference: Reference,
        replacement: Replacement,
    },
    /// Identity is explicitly forbidden.
    Denied { reference: Reference, reason: String },
    /// Identity is absent from the allow list.
    Unknown { reference: Reference },
    /// Expression does not split into identity and revision.
    Malformed { raw: String },
}

impl Decision {
    /// DENIED, UNKNOWN and MALFORMED fail the run; OK and REPLACE do not.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Decision::Denied { .. } | Decision::Unknown { .. } | Decision::Malformed { .. }
        )
    }

    pub fn reference(&self) -> Option<&Reference> {
        match self {
            Decision::Ok { reference }
            | Decision::Replace { reference, .. }
            | Decision::Denied { reference, .. }
            | Decision::Unknown { reference } => Some(reference),
            Decision::Malformed { .. } => None,
        }
    }

    /// The reference text exactly as it was found on the line.
    pub fn original(&self) -> String {
        match self {
            Decision::Malformed { raw } => raw.clone(),
            other => other
                .reference()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

/// Result of running the policy engine over one raw expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// Out of policy scope (local or container reference). No diagnostic is emitted.
    Skip,
    Decided(Decision),
}
