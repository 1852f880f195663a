pub mod indicators;
pub mod order_id;
pub mod signature;

pub use order_id::generate_order_id_with_tag;
