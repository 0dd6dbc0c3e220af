/// Cooperative timer queue shared by rendering, narration and capture.
pub mod scheduler;
