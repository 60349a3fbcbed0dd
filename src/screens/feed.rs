//! Image feed screen
use std::sync::Arc;

use crate::data::ImageRepository;
use crate::domain::Image;
use crate::mvi::{Reducer, ScreenLogic, StateContainer};
use crate::navigation::{AppDestination, Navigator};

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct FeedState {
    pub is_loading: bool,
    pub images: Vec<Image>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum FeedEvent {
    LoadImages,
    ImageClicked(i64),
    LoadImagesSuccess(Vec<Image>),
    LoadImagesFailure(String),
}

#[derive(Debug)]
pub enum FeedEffect {}

pub struct FeedScreen {
    images: Arc<dyn ImageRepository>,
    navigator: Arc<Navigator>,
}

impl FeedScreen {
    pub fn new(images: Arc<dyn ImageRepository>, navigator: Arc<Navigator>) -> Self {
        Self { images, navigator }
    }
}

impl Reducer for FeedScreen {
    type State = FeedState;
    type Event = FeedEvent;
    type Effect = FeedEffect;

    fn reduce(&self, previous: &FeedState, event: &FeedEvent) -> (FeedState, Option<FeedEffect>) {
        let mut state = previous.clone();
        match event {
            FeedEvent::LoadImages => {
                state.is_loading = true;
                state.error = None;
                (state, None)
            }
            FeedEvent::LoadImagesSuccess(images) => {
                state.is_loading = false;
                state.images = images.clone();
                (state, None)
            }
            FeedEvent::LoadImagesFailure(error) => {
                state.is_loading = false;
                state.error = Some(error.clone());
                (state, None)
            }
            FeedEvent::ImageClicked(_) => (state, None),
        }
    }
}

impl ScreenLogic for FeedScreen {
    fn initial_load(&self, container: &StateContainer<Self>) {
        container.dispatch(FeedEvent::LoadImages);
    }

    fn handle_event(&self, container: &StateContainer<Self>, event: FeedEvent) {
        match event {
            FeedEvent::LoadImages => {
                container.set_state(FeedEvent::LoadImages);
                let images = Arc::clone(&self.images);
                let dispatcher = container.clone();
                container.spawn_guarded(
                    async move {
                        match images.get_images().await {
                            Ok(images) => {
                                dispatcher.dispatch(FeedEvent::LoadImagesSuccess(images))
                            }
                            Err(error) => dispatcher
                                .dispatch(FeedEvent::LoadImagesFailure(error.to_string())),
                        }
                    },
                    FeedEvent::LoadImagesFailure,
                );
            }
            FeedEvent::ImageClicked(id) => {
                self.navigator.navigate(AppDestination::ImageDetails { id });
            }
            other => container.set_state(other),
        }
    }
}
