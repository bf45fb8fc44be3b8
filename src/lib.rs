pub mod auth;
pub mod bootstrap;
pub mod core;
pub mod models;
pub mod page;
pub mod router;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;
