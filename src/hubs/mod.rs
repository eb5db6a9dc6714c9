pub mod dedupe;
pub mod mapper;
pub mod shape;
