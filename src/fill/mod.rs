pub mod coerce;
pub mod fill_model;
pub mod injector;
pub mod nudge;
pub mod options;
