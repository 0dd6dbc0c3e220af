/// Backend trait and frame buffer type.
pub mod backend;
/// Ken Burns camera interpolation and cover-fit geometry.
pub mod camera;
/// Caption wrapping and placement.
pub mod caption;
/// CPU raster backend.
pub mod cpu;
/// Frame planning.
pub mod frame;
