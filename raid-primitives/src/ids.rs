//! Actor and target identifier types.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates an identifier from its raw numeric value.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw numeric value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|source| Error::InvalidId {
                        value: s.to_owned(),
                        source,
                    })
            }
        }
    };
}

numeric_id!(
    /// Identifier of a live actor (a player) attempting an action.
    ActorId
);

numeric_id!(
    /// Identifier of a raid-protectable structure, usually the network id of its
    /// tool cupboard.
    TargetId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_actor_id() {
        let id = ActorId::new(76_561_198_000_000_001);
        let parsed = id.to_string().parse::<ActorId>().expect("parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_non_numeric_target_id() {
        let err = "cupboard".parse::<TargetId>().expect_err("should fail");
        assert!(matches!(err, Error::InvalidId { ref value, .. } if value == "cupboard"));
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&TargetId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
