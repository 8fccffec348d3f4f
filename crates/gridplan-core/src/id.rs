use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_ids {
    ($($(#[$meta:meta])* $name:ident => $prefix:literal;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(String);

            impl $name {
                pub fn new(id: impl Into<String>) -> Self {
                    Self(id.into())
                }

                pub(crate) fn numbered(serial: u64) -> Self {
                    Self(format!("{}-{}", $prefix, serial))
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }

                pub fn is_empty(&self) -> bool {
                    self.0.is_empty()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(id: &str) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

entity_ids! {
    /// Identifies a device on the grid.
    DeviceId => "dev";

    /// Identifies a single pipeline belt cell.
    PipelineCellId => "pipe";

    /// Identifies a pipeline element (bridge, splitter, merger).
    ElementId => "pel";

    /// Groups the pipeline cells drawn in one drag gesture.
    SegmentId => "seg";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_ids_use_prefix() {
        assert_eq!(DeviceId::numbered(3).as_str(), "dev-3");
        assert_eq!(PipelineCellId::numbered(1).as_str(), "pipe-1");
        assert_eq!(ElementId::numbered(7).as_str(), "pel-7");
        assert_eq!(SegmentId::numbered(2).to_string(), "seg-2");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = DeviceId::new("dev-abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"dev-abc\"");
        let back: DeviceId = serde_json::from_str("\"dev-abc\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(SegmentId::from("seg-1"), 3);
        map.insert(SegmentId::from("seg-2"), 5);
        assert_eq!(map[&SegmentId::from("seg-1")], 3);
    }
}
