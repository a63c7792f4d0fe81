pub mod bias;
pub mod config;
pub mod correct;
pub mod flat;
pub mod info;
pub mod run;
