pub mod dynamics;
pub mod env;
pub mod episode;
pub mod lane;
pub mod logger;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod run_loop;
pub mod sensors;
pub mod track;
pub mod zone;

pub use env::*;
pub use logger::*;
pub use policy::*;
pub use run_loop::*;
pub use sensors::{Geometry, SensorArray};
pub use track::{TrackWorld, World};
