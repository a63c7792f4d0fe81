pub mod error;
pub mod consts;
pub mod frame;
pub mod io;
pub mod stats;
pub mod combine;
pub mod calibrate;
pub mod correct;
pub mod post;
pub mod pipeline;
