//! Image details screen: one image plus more work by the same photographer
use std::sync::Arc;

use crate::data::ImageRepository;
use crate::domain::Image;
use crate::mvi::{Reducer, ScreenLogic, StateContainer};
use crate::navigation::Navigator;

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct ImageDetailsState {
    pub image_id: Option<i64>,
    pub current_image: Option<Image>,
    pub similar_images: Vec<Image>,
    pub is_loading: bool,
    pub is_loading_similar: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum ImageDetailsEvent {
    ScreenOpened(i64),
    RetryLoadDetails,
    BackButtonClicked,
    /// Tapping a similar image reloads the screen around it.
    SimilarImageClicked(i64),
    ImageDetailsLoaded(Image),
    SimilarImagesLoaded(Vec<Image>),
    LoadFailed(String),
}

#[derive(Debug)]
pub enum ImageDetailsEffect {}

pub struct ImageDetailsScreen {
    image_id: i64,
    images: Arc<dyn ImageRepository>,
    navigator: Arc<Navigator>,
}

impl ImageDetailsScreen {
    pub fn new(image_id: i64, images: Arc<dyn ImageRepository>, navigator: Arc<Navigator>) -> Self {
        Self {
            image_id,
            images,
            navigator,
        }
    }

    /// Load the image itself, then its related set. The details landing first
    /// lets the screen render while the similar strip is still loading.
    fn load(&self, container: &StateContainer<Self>, id: i64) {
        container.set_state(ImageDetailsEvent::ScreenOpened(id));
        let images = Arc::clone(&self.images);
        let dispatcher = container.clone();
        container.spawn_guarded(
            async move {
                match images.get_image(id).await {
                    Ok(image) => dispatcher.dispatch(ImageDetailsEvent::ImageDetailsLoaded(image)),
                    Err(error) => {
                        dispatcher.dispatch(ImageDetailsEvent::LoadFailed(error.to_string()));
                        return;
                    }
                }
                match images.get_similar_images(id).await {
                    Ok(similar) => {
                        dispatcher.dispatch(ImageDetailsEvent::SimilarImagesLoaded(similar))
                    }
                    Err(error) => {
                        dispatcher.dispatch(ImageDetailsEvent::LoadFailed(error.to_string()))
                    }
                }
            },
            ImageDetailsEvent::LoadFailed,
        );
    }
}

impl Reducer for ImageDetailsScreen {
    type State = ImageDetailsState;
    type Event = ImageDetailsEvent;
    type Effect = ImageDetailsEffect;

    fn reduce(
        &self,
        previous: &ImageDetailsState,
        event: &ImageDetailsEvent,
    ) -> (ImageDetailsState, Option<ImageDetailsEffect>) {
        let mut state = previous.clone();
        match event {
            ImageDetailsEvent::ScreenOpened(id) => (
                ImageDetailsState {
                    image_id: Some(*id),
                    is_loading: true,
                    is_loading_similar: true,
                    ..ImageDetailsState::default()
                },
                None,
            ),
            ImageDetailsEvent::ImageDetailsLoaded(image) => {
                state.current_image = Some(image.clone());
                state.is_loading = false;
                state.error = None;
                (state, None)
            }
            ImageDetailsEvent::SimilarImagesLoaded(similar) => {
                state.similar_images = similar.clone();
                state.is_loading_similar = false;
                (state, None)
            }
            ImageDetailsEvent::LoadFailed(error) => {
                state.is_loading = false;
                state.is_loading_similar = false;
                state.error = Some(error.clone());
                (state, None)
            }
            _ => (previous.clone(), None),
        }
    }
}

impl ScreenLogic for ImageDetailsScreen {
    fn initial_load(&self, container: &StateContainer<Self>) {
        self.load(container, self.image_id);
    }

    fn handle_event(&self, container: &StateContainer<Self>, event: ImageDetailsEvent) {
        match event {
            ImageDetailsEvent::RetryLoadDetails => {
                let id = container.current_state().image_id.unwrap_or(self.image_id);
                self.load(container, id);
            }
            ImageDetailsEvent::SimilarImageClicked(id) => self.load(container, id),
            ImageDetailsEvent::BackButtonClicked => self.navigator.navigate_back(),
            other => container.set_state(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CuratedImageLibrary;
    use tokio::time::Duration;

    fn details(id: i64) -> StateContainer<ImageDetailsScreen> {
        let screen = ImageDetailsScreen::new(
            id,
            Arc::new(CuratedImageLibrary::new(Duration::from_millis(1))),
            Arc::new(Navigator::new()),
        );
        StateContainer::new(screen, ImageDetailsState::default())
    }

    async fn settled(
        sub: &mut crate::mvi::StateSubscription<ImageDetailsScreen>,
    ) -> ImageDetailsState {
        loop {
            let state = sub.next().await.expect("state stream stays open");
            if !state.is_loading && !state.is_loading_similar {
                break state;
            }
        }
    }

    #[tokio::test]
    async fn details_load_before_the_similar_strip() {
        let container = details(101);
        let mut sub = container.subscribe();

        let with_image = loop {
            let state = sub.next().await.expect("state stream stays open");
            if state.current_image.is_some() {
                break state;
            }
        };
        // The main image can land while similar images are still loading.
        assert!(!with_image.is_loading);

        let state = if with_image.is_loading_similar {
            settled(&mut sub).await
        } else {
            with_image
        };
        assert_eq!(state.current_image.as_ref().unwrap().id, 101);
        assert!(state
            .similar_images
            .iter()
            .all(|image| image.photographer == "Lena Petrova" && image.id != 101));
    }

    #[tokio::test]
    async fn clicking_a_similar_image_reloads_around_it() {
        let container = details(101);
        let mut sub = container.subscribe();
        let first = settled(&mut sub).await;
        let next_id = first.similar_images[0].id;

        container.dispatch(ImageDetailsEvent::SimilarImageClicked(next_id));
        assert_eq!(container.current_state().image_id, Some(next_id));

        let state = settled(&mut sub).await;
        assert_eq!(state.current_image.as_ref().unwrap().id, next_id);
    }

    #[tokio::test]
    async fn missing_image_surfaces_an_error() {
        let container = details(999);
        let mut sub = container.subscribe();

        let failed = loop {
            let state = sub.next().await.expect("state stream stays open");
            if state.error.is_some() {
                break state;
            }
        };
        assert!(!failed.is_loading);
        assert!(failed.current_image.is_none());
    }
}
