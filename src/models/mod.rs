mod chat;
mod news;

pub use chat::*;
pub use news::*;
