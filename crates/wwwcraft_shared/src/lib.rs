pub mod anchor;
pub mod block;
pub mod regen;
pub mod save;
