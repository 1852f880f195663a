pub mod market;
pub mod orders;
