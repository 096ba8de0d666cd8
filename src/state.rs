//! Tri-state result for screen data, also returned by the graph routes.

use serde::Serialize;

use crate::error::Error;

/// What a screen shows while its data is fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum UiState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> UiState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }
}

impl<T> From<Result<T, Error>> for UiState<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(value) => UiState::Success(value),
            Err(err) => {
                log::warn!("screen data unavailable: {}", err);
                UiState::Error(err.to_string())
            }
        }
    }
}
