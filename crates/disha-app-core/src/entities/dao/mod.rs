pub mod message;
pub mod user;

pub use message::{Message, Sender};
pub use user::User;
