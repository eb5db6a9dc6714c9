pub mod cities;
pub mod client;
pub mod headers;
