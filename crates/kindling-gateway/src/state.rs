use kindling_core::BestStories;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    stories: Arc<dyn BestStories>,
}

impl AppState {
    pub fn new(stories: Arc<dyn BestStories>) -> Self {
        Self { stories }
    }

    pub fn stories(&self) -> &dyn BestStories {
        self.stories.as_ref()
    }
}
