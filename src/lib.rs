pub mod alert;
pub mod auth;
pub mod config;
pub mod github;
pub mod interactive;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod unattended;

#[cfg(test)]
pub(crate) mod test_support;
