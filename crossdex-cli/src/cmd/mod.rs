pub mod config;
pub mod doctor;
pub mod plan;
pub mod progress;
pub mod run;
pub mod serve;
pub mod validate;
