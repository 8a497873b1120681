pub mod bus;
pub mod config;
pub mod controllers;
pub mod error;
pub mod services;
pub mod template;
#[doc(hidden)]
pub mod test_support;
pub mod wizard;
