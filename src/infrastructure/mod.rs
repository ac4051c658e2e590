pub mod cache;
pub mod stooq;
