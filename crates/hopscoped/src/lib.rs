pub mod cli;
pub mod evaluate;
pub mod exists;
pub mod output;
pub mod path;
pub mod summary;
pub mod unit;
