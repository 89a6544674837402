pub mod payments;
pub mod properties;
pub mod stats;
pub mod users;
