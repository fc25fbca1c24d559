pub mod month;
pub mod trip;
