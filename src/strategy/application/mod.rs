pub mod controller;
pub mod risk;
pub mod tasks;
