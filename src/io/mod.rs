pub mod demand;
pub mod presenter;
pub mod reporting;
