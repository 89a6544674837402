pub mod activities;
pub mod billing;
pub mod favorites;
pub mod profile;
pub mod stats;
