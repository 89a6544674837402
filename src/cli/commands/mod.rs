pub mod password;
pub mod remote;
pub mod seed;
pub mod token;
