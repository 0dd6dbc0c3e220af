/// Scene catalog container and JSON loading.
pub mod catalog;
/// Scene descriptor.
pub mod model;
