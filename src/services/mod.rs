pub mod membership;
pub mod trips;
