pub mod logging;
mod utils;

pub use logging::{
    Backend, Builder, Config, Destination, Flags, Level, Logger, Record, RotatingFileBackend,
    StaticBackend,
};
