pub mod demand;
pub mod package;
