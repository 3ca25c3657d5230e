pub mod base;
pub mod comment;
pub mod mention;
pub mod notification;
pub mod user;

pub use base::BaseDao;
