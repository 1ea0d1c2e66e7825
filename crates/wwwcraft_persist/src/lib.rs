pub mod download;
pub mod gateway;
pub mod remote;
pub mod store;
