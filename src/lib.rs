pub mod apis;
pub mod config;
pub mod constants;
pub mod districts;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod render;
pub mod reshape;
pub mod symbology;
pub mod types;
