pub mod create;
pub mod decrease_target_size;
pub mod delete;
pub mod delete_nodes;
pub mod exist;
pub mod increase_size;
pub mod instance_types;
pub mod report;
pub mod show;
pub mod target_size;
