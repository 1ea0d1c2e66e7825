/// Sky colour used for distance fog.
pub const FOG_COLOR: u32 = 0x87ceeb;
pub const FOG_NEAR: f32 = 1.0;
/// Extra blocks allowed on top of the square chunk footprint.
const BLOCK_BUDGET_SLACK: u64 = 500;
const FOG_BLOCKS_PER_CHUNK: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: u32,
    pub near: f32,
    pub far: f32,
}

/// Terrain parameters derived from a render distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegenParams {
    pub render_distance: u32,
    pub max_block_budget: u64,
    pub fog: Fog,
}

impl RegenParams {
    pub fn for_distance(render_distance: u32, chunk_size: u32) -> Self {
        Self {
            render_distance,
            max_block_budget: max_block_budget(render_distance, chunk_size),
            fog: Fog {
                color: FOG_COLOR,
                near: FOG_NEAR,
                far: fog_far(render_distance),
            },
        }
    }
}

/// `(d * chunk * 2 + chunk)^2 + 500`
pub fn max_block_budget(render_distance: u32, chunk_size: u32) -> u64 {
    let side = u64::from(render_distance) * u64::from(chunk_size) * 2 + u64::from(chunk_size);
    side * side + BLOCK_BUDGET_SLACK
}

/// `d * 24 + 24`
pub fn fog_far(render_distance: u32) -> f32 {
    (render_distance * FOG_BLOCKS_PER_CHUNK + FOG_BLOCKS_PER_CHUNK) as f32
}
