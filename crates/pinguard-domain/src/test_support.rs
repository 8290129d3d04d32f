use crate::policy::{AllowEntry, DenyEntry, Policy};

pub fn allow(identity: &str, tag: &str) -> AllowEntry {
    AllowEntry::tag(identity, tag)
}

pub fn allow_hash(identity: &str, tag: &str, hash: &str) -> AllowEntry {
    AllowEntry::hash(identity, tag, hash)
}

pub fn deny(identity: &str, reason: &str) -> DenyEntry {
    DenyEntry::new(identity, reason)
}

pub fn policy(allow: Vec<AllowEntry>, deny: Vec<DenyEntry>) -> Policy {
    Policy::new(allow, deny).expect("test policy must be valid")
}
