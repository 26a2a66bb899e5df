pub mod insurance;
pub mod lending;
