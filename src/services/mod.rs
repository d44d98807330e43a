pub mod files;
pub mod fitting;
pub mod output;
