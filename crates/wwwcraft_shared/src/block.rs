use std::fmt;

use glam::IVec3;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const LINK_TAG: &str = "link";
pub const ANCHOR_TAG: &str = "anchor";

/// Behaviour carried by a user-placed block. On disk this is a positional
/// string array whose first entry is the type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum BlockAttributes {
    /// `["link", href]` or `["link", href, target]`
    Link {
        href: String,
        target: Option<String>,
    },
    /// `["anchor", name]`
    Anchor { name: String },
}

impl BlockAttributes {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Link { .. } => LINK_TAG,
            Self::Anchor { .. } => ANCHOR_TAG,
        }
    }

    pub fn anchor_name(&self) -> Option<&str> {
        match self {
            Self::Anchor { name } => Some(name),
            Self::Link { .. } => None,
        }
    }
}

impl TryFrom<Vec<String>> for BlockAttributes {
    type Error = String;

    fn try_from(values: Vec<String>) -> Result<Self, Self::Error> {
        let mut values = values.into_iter();
        let Some(tag) = values.next() else {
            return Err("block attributes are empty".to_string());
        };

        match tag.as_str() {
            LINK_TAG => {
                let href = values
                    .next()
                    .ok_or_else(|| "link block is missing its href".to_string())?;
                Ok(Self::Link {
                    href,
                    target: values.next(),
                })
            }
            ANCHOR_TAG => {
                let name = values
                    .next()
                    .ok_or_else(|| "anchor block is missing its name".to_string())?;
                Ok(Self::Anchor { name })
            }
            other => Err(format!("unknown block attribute tag '{other}'")),
        }
    }
}

impl From<BlockAttributes> for Vec<String> {
    fn from(value: BlockAttributes) -> Self {
        match value {
            BlockAttributes::Link { href, target } => {
                let mut values = vec![LINK_TAG.to_string(), href];
                values.extend(target);
                values
            }
            BlockAttributes::Anchor { name } => vec![ANCHOR_TAG.to_string(), name],
        }
    }
}

impl fmt::Display for BlockAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link {
                href,
                target: Some(target),
            } if !target.is_empty() => write!(f, "link -> {href} ({target})"),
            Self::Link { href, .. } => write!(f, "link -> {href}"),
            Self::Anchor { name } => write!(f, "anchor #{name}"),
        }
    }
}

/// A block in the saved block list. Terrain edits and link/anchor blocks
/// share the list; list order is placement order and is kept intact through
/// save and load.
///
/// Only the coordinates are required. Keys this crate does not interpret
/// (`type`, `placed`, ...) ride along in `extra`, as does an `attributes`
/// value that is not a recognised link or anchor, so re-encoding writes them
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct CustomBlock {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BlockAttributes>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomBlock {
    pub fn new(pos: IVec3, attributes: BlockAttributes) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            attributes: Some(attributes),
            extra: Map::new(),
        }
    }

    pub fn anchor(pos: IVec3, name: impl Into<String>) -> Self {
        Self::new(pos, BlockAttributes::Anchor { name: name.into() })
    }

    pub fn position(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    pub fn anchor_name(&self) -> Option<&str> {
        self.attributes.as_ref().and_then(BlockAttributes::anchor_name)
    }
}

impl TryFrom<Value> for CustomBlock {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = value else {
            return Err("block entry is not an object".to_string());
        };

        let mut coordinate = |axis: &str| {
            fields
                .remove(axis)
                .and_then(|value| value.as_i64())
                .and_then(|value| i32::try_from(value).ok())
                .ok_or_else(|| format!("block is missing an integer '{axis}' coordinate"))
        };
        let x = coordinate("x")?;
        let y = coordinate("y")?;
        let z = coordinate("z")?;

        let attributes = match fields.remove("attributes") {
            None => None,
            Some(raw) => match serde_json::from_value::<BlockAttributes>(raw.clone()) {
                Ok(attributes) => Some(attributes),
                Err(err) => {
                    debug!("Keeping uninterpreted block attributes at ({x}, {y}, {z}): {err}");
                    fields.insert("attributes".to_string(), raw);
                    None
                }
            },
        };

        Ok(Self {
            x,
            y,
            z,
            attributes,
            extra: fields,
        })
    }
}

impl fmt::Display for CustomBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)?;
        match &self.attributes {
            Some(attributes) => write!(f, " {attributes}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockAttributes, CustomBlock};
    use glam::IVec3;
    use serde_json::json;

    #[test]
    fn attributes_serialize_as_tagged_string_array() {
        let block = CustomBlock::new(
            IVec3::new(4, -2, 7),
            BlockAttributes::Link {
                href: "https://example.org".to_string(),
                target: Some("_blank".to_string()),
            },
        );

        let value = serde_json::to_value(&block).expect("serialize link block");
        assert_eq!(
            value,
            json!({
                "x": 4,
                "y": -2,
                "z": 7,
                "attributes": ["link", "https://example.org", "_blank"]
            })
        );
    }

    #[test]
    fn link_keeps_its_array_length() {
        let short: BlockAttributes =
            serde_json::from_value(json!(["link", "#spawn"])).expect("decode short link");
        assert_eq!(
            short,
            BlockAttributes::Link {
                href: "#spawn".to_string(),
                target: None,
            }
        );
        assert_eq!(
            serde_json::to_value(&short).expect("encode short link"),
            json!(["link", "#spawn"])
        );

        let full = json!(["link", "https://example.org", ""]);
        let decoded: BlockAttributes =
            serde_json::from_value(full.clone()).expect("decode full link");
        assert_eq!(serde_json::to_value(&decoded).expect("encode full link"), full);
    }

    #[test]
    fn rejects_unknown_or_incomplete_tags() {
        assert!(serde_json::from_value::<BlockAttributes>(json!([])).is_err());
        assert!(serde_json::from_value::<BlockAttributes>(json!(["anchor"])).is_err());
        assert!(serde_json::from_value::<BlockAttributes>(json!(["portal", "x"])).is_err());
        assert!(serde_json::from_value::<BlockAttributes>(json!(["link"])).is_err());
    }

    #[test]
    fn terrain_edits_keep_their_fields() {
        for raw in [
            json!({ "x": 1, "y": 2, "z": 3, "type": 4, "placed": true, "attributes": [] }),
            json!({ "x": 5, "y": 6, "z": 7, "type": 0, "placed": false }),
            json!({ "x": 8, "y": 9, "z": 10, "type": 12, "attributes": ["portal", "b"] }),
            json!({ "x": 8, "y": 9, "z": 10, "type": 12, "placed": true,
                    "attributes": ["anchor", "home"] }),
        ] {
            let block: CustomBlock = serde_json::from_value(raw.clone()).expect("decode block");
            assert_eq!(serde_json::to_value(&block).expect("encode block"), raw);
        }

        let plain: CustomBlock =
            serde_json::from_value(json!({ "x": 5, "y": 6, "z": 7, "type": 0 }))
                .expect("decode plain block");
        assert_eq!(plain.attributes, None);
        assert_eq!(plain.anchor_name(), None);
        assert_eq!(plain.extra.get("type"), Some(&json!(0)));
    }

    #[test]
    fn entries_without_integer_coordinates_are_rejected() {
        assert!(serde_json::from_value::<CustomBlock>(json!("block")).is_err());
        assert!(serde_json::from_value::<CustomBlock>(json!({ "x": 1, "y": 2 })).is_err());
        assert!(
            serde_json::from_value::<CustomBlock>(json!({ "x": 1, "y": "2", "z": 3 })).is_err()
        );
        assert!(serde_json::from_value::<CustomBlock>(
            json!({ "x": 1, "y": 4_000_000_000i64, "z": 3 })
        )
        .is_err());
    }

    #[test]
    fn anchor_name_only_reported_for_anchors() {
        let anchor = CustomBlock::anchor(IVec3::ZERO, "home");
        assert_eq!(anchor.anchor_name(), Some("home"));
        assert_eq!(anchor.attributes.as_ref().map(BlockAttributes::tag), Some("anchor"));
        assert_eq!(anchor.position(), IVec3::ZERO);
        assert_eq!(anchor.to_string(), "(0, 0, 0) anchor #home");

        let link = BlockAttributes::Link {
            href: "home".to_string(),
            target: Some(String::new()),
        };
        assert_eq!(link.anchor_name(), None);
        assert_eq!(link.to_string(), "link -> home");
    }
}
