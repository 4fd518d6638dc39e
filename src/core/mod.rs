pub mod basics;
pub mod chunks;
pub mod constants;
pub mod units;
