pub mod auth;
pub mod cli;
pub mod compose;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;
pub mod store;
pub mod util;
