pub mod comment;
pub mod mention;
pub mod notification;
pub mod user;

pub use comment::*;
pub use mention::*;
pub use notification::*;
pub use user::*;
