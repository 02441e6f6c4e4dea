// utils.rs
pub mod any_map;
pub mod spin_lock;
