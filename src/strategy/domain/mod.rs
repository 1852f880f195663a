pub mod engine;
pub mod indicators;
pub mod model;
pub mod params;
pub mod state;
