use glam::Vec3;
use tracing::{debug, info};
use wwwcraft_shared::block::CustomBlock;
use wwwcraft_shared::regen::{Fog, RegenParams};
use wwwcraft_shared::save::random_seed;

pub const DEFAULT_CHUNK_SIZE: u32 = 24;
/// Camera height a fresh world starts at.
pub const NEW_WORLD_CAMERA_Y: f32 = 40.0;

/// Seeds of every noise channel the terrain generator samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSeeds {
    pub terrain: f64,
    pub stone: f64,
    pub tree: f64,
    pub coal: f64,
    pub leaf: f64,
}

impl NoiseSeeds {
    pub fn random() -> Self {
        Self {
            terrain: random_seed(),
            stone: random_seed(),
            tree: random_seed(),
            coal: random_seed(),
            leaf: random_seed(),
        }
    }
}

/// The terrain, camera and player the menu drives. Owned by the engine; the
/// controller only mutates it from the menu loop.
pub trait GameWorld {
    fn chunk_size(&self) -> u32;

    fn seeds(&self) -> NoiseSeeds;
    fn set_seeds(&mut self, seeds: NoiseSeeds);

    fn custom_blocks(&self) -> &[CustomBlock];
    /// Replaces the authoritative custom block list wholesale.
    fn replace_custom_blocks(&mut self, blocks: Vec<CustomBlock>);
    fn push_custom_block(&mut self, block: CustomBlock);

    fn set_render_distance(&mut self, render_distance: u32);
    fn set_max_block_budget(&mut self, budget: u64);
    fn init_blocks(&mut self);
    fn generate(&mut self);
    fn set_fog(&mut self, fog: Fog);

    fn camera_position(&self) -> Vec3;
    fn set_camera_position(&mut self, position: Vec3);
    /// Applies the field of view and refreshes the projection.
    fn set_camera_fov(&mut self, fov_degrees: f32);

    fn set_walking_mode(&mut self);
}

/// Pushes a new render distance into the terrain and regenerates it.
/// Distance and budget land before regeneration, fog is swapped after it.
pub fn reconfigure<W: GameWorld + ?Sized>(world: &mut W, render_distance: u32) -> RegenParams {
    let params = RegenParams::for_distance(render_distance, world.chunk_size());
    world.set_render_distance(params.render_distance);
    world.set_max_block_budget(params.max_block_budget);
    world.init_blocks();
    world.generate();
    world.set_fog(params.fog);
    info!(
        "Terrain regenerated: distance {} chunk(s), budget {} block(s), fog far {}",
        params.render_distance, params.max_block_budget, params.fog.far
    );
    params
}

/// Stand-in world for the console frontend. Keeps the state a renderer would
/// read and counts regenerations.
#[derive(Debug, Clone)]
pub struct HeadlessWorld {
    chunk_size: u32,
    seeds: NoiseSeeds,
    custom_blocks: Vec<CustomBlock>,
    pub render_distance: u32,
    pub max_block_budget: u64,
    pub fog: Option<Fog>,
    pub camera_position: Vec3,
    pub camera_fov: f32,
    pub walking: bool,
    pub generations: u32,
}

impl HeadlessWorld {
    pub fn new(chunk_size: u32) -> Self {
        Self {
            chunk_size,
            seeds: NoiseSeeds::random(),
            custom_blocks: Vec::new(),
            render_distance: 0,
            max_block_budget: 0,
            fog: None,
            camera_position: Vec3::new(0.0, NEW_WORLD_CAMERA_Y, 0.0),
            camera_fov: 75.0,
            walking: false,
            generations: 0,
        }
    }
}

impl Default for HeadlessWorld {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl GameWorld for HeadlessWorld {
    fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    fn seeds(&self) -> NoiseSeeds {
        self.seeds
    }

    fn set_seeds(&mut self, seeds: NoiseSeeds) {
        self.seeds = seeds;
    }

    fn custom_blocks(&self) -> &[CustomBlock] {
        &self.custom_blocks
    }

    fn replace_custom_blocks(&mut self, blocks: Vec<CustomBlock>) {
        self.custom_blocks = blocks;
    }

    fn push_custom_block(&mut self, block: CustomBlock) {
        debug!("Placed custom block {block}");
        self.custom_blocks.push(block);
    }

    fn set_render_distance(&mut self, render_distance: u32) {
        self.render_distance = render_distance;
    }

    fn set_max_block_budget(&mut self, budget: u64) {
        self.max_block_budget = budget;
    }

    fn init_blocks(&mut self) {
        debug!("Reset terrain block storage for {} block(s)", self.max_block_budget);
    }

    fn generate(&mut self) {
        self.generations += 1;
        debug!(
            "Generated terrain #{} with seed {} and {} custom block(s)",
            self.generations,
            self.seeds.terrain,
            self.custom_blocks.len()
        );
    }

    fn set_fog(&mut self, fog: Fog) {
        self.fog = Some(fog);
    }

    fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    fn set_camera_position(&mut self, position: Vec3) {
        self.camera_position = position;
    }

    fn set_camera_fov(&mut self, fov_degrees: f32) {
        self.camera_fov = fov_degrees;
    }

    fn set_walking_mode(&mut self) {
        self.walking = true;
    }
}
