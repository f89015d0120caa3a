use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the raw numeric identifier.
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

id_newtype!(
    /// Identity token for an interacting agent (a tracked hand or controller).
    AgentId,
    "agent"
);
id_newtype!(
    /// Identity token for an interactable entity.
    EntityId,
    "entity"
);
id_newtype!(
    /// Identity token for a snap zone.
    ZoneId,
    "zone"
);
id_newtype!(
    /// Identity of an attach point, unique within its owning entity.
    AttachPointId,
    "attach"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_prefix() {
        assert_eq!(AgentId(3).to_string(), "agent#3");
        assert_eq!(EntityId(12).to_string(), "entity#12");
        assert_eq!(ZoneId(0).to_string(), "zone#0");
    }

    #[test]
    fn ids_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&EntityId(7)).unwrap();
        assert_eq!(json, "7");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EntityId(7));
    }
}
