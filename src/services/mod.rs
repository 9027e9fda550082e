mod gnews;
mod trigger;

pub use gnews::NewsClient;
pub use trigger::NewsTrigger;
