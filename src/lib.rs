pub mod auth;
pub mod config;
pub mod dashboard;
pub mod feedback;
pub mod flash;
pub mod permission;
pub mod reports;
pub mod state;
pub mod store;
pub mod template;
pub mod tenders;
pub mod util_resp;
pub mod validation;
pub mod widgets;

#[cfg(test)]
mod test;
