pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod paths;
pub mod session;
pub mod srs;
pub mod state;

#[cfg(test)]
pub mod testing;
