mod health;
mod stories;

pub use health::health_handler;
pub use stories::best_stories_handler;
