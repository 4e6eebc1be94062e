// Domain layer - Core beat scheduling logic

pub mod errors;
pub mod model;
pub mod rules;
