mod home;
mod landing;
mod quiz;
mod results;
mod state;
mod toast;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use home::HomeView;
pub use landing::LandingView;
pub use quiz::{ExamView, StudyView};
pub use results::ResultsView;
pub use state::{ViewError, ViewState, redirect_home_after, view_state_from_resource};
pub use toast::ToastArea;
