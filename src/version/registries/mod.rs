//! Registry implementations for looking up releases

pub mod github;

pub use github::GitHubRegistry;
