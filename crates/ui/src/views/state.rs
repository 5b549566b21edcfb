use dioxus::prelude::*;
use dioxus_router::Navigator;
use services::{ApiError, LibraryError, SessionError};

use crate::routes::Route;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    NotFound,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::NotFound => "Quiz not found.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

impl From<&SessionError> for ViewError {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::NotFound => ViewError::NotFound,
            _ => ViewError::Unknown,
        }
    }
}

impl From<&LibraryError> for ViewError {
    fn from(err: &LibraryError) -> Self {
        match err {
            LibraryError::Api(ApiError::NotFound) => ViewError::NotFound,
            _ => ViewError::Unknown,
        }
    }
}

/// Wait out the error redirect, if the error asks for one, then go home.
pub async fn redirect_home_after(navigator: Navigator, err: &SessionError) {
    if let Some(delay) = err.redirect_delay() {
        tokio::time::sleep(delay).await;
        let _ = navigator.replace(Route::Home {});
    }
}
