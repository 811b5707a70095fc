//! String-backed identifiers shared across the placement engine and agent.
//!
//! Unlike `aura-swarm`'s blake3-derived `AgentId`, these identifiers are
//! assigned by external collaborators (the master's job store, the agent's
//! own pod creation) rather than generated here, so they are thin wrappers
//! around `String` rather than fixed-size hashes.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(PodId, "Identifier of a pod, assigned by the master's job store.");
string_id!(JobId, "Identifier of a job, assigned by the master's job store.");
string_id!(
    Endpoint,
    "An agent's network endpoint (`host:port`), used as the resource map's key."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_string() {
        let pod_id = PodId::from("pod-42".to_string());
        assert_eq!(pod_id.as_str(), "pod-42");
        assert_eq!(pod_id.to_string(), "pod-42");
    }

    #[test]
    fn serializes_as_a_bare_string() {
        let endpoint = Endpoint::from("10.0.0.1:8080");
        let json = serde_json::to_string(&endpoint).unwrap();
        assert_eq!(json, "\"10.0.0.1:8080\"");
        let back: Endpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, endpoint);
    }

    #[test]
    fn equal_ids_hash_equal() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(JobId::from("job-1"));
        assert!(set.contains(&JobId::from("job-1")));
    }
}
