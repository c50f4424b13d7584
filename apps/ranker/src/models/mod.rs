pub mod score;
pub mod screening;
pub mod weights;
