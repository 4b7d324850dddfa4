pub mod color;
pub mod time;
