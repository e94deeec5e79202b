pub mod curriculum;
pub mod symbol;
