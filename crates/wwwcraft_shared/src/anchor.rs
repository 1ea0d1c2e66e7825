//! Spawn anchors addressed through the URL fragment (`#<anchor name>`).
//!
//! When several anchors share a name, the first one in placement order wins
//! and the rest can never be reached through the fragment.

use glam::IVec3;

use crate::block::CustomBlock;
use crate::save::{GameSave, SavedPosition};

/// Spawn height above the anchor block so the player stands on top of it.
pub const ANCHOR_SPAWN_HEIGHT: i32 = 2;

pub fn fragment_name(fragment: &str) -> &str {
    fragment.strip_prefix('#').unwrap_or(fragment)
}

pub fn resolve_anchor(blocks: &[CustomBlock], fragment: &str) -> Option<SavedPosition> {
    let name = fragment_name(fragment);
    if name.is_empty() {
        return None;
    }

    blocks
        .iter()
        .find(|block| block.anchor_name() == Some(name))
        .map(|block| {
            SavedPosition::new(
                f64::from(block.x),
                f64::from(block.y) + f64::from(ANCHOR_SPAWN_HEIGHT),
                f64::from(block.z),
            )
        })
}

/// Where a loaded save should put the camera: a matching anchor first, the
/// saved position otherwise.
pub fn spawn_point(save: &GameSave, fragment: &str) -> Option<SavedPosition> {
    resolve_anchor(&save.blocks, fragment).or(save.position)
}

pub fn anchors(blocks: &[CustomBlock]) -> impl Iterator<Item = (&str, IVec3)> + '_ {
    blocks.iter().filter_map(|block| {
        block
            .anchor_name()
            .map(|name| (name, block.position()))
    })
}
