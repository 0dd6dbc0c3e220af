/// Scene image loading and decoding.
pub mod image;
/// Caption font loading, shaping and measurement.
pub mod text;
