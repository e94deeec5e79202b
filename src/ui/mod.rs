pub mod gamepad;
pub mod input;
pub mod prose;
pub mod renderer;
pub mod sound;
pub mod speech;
