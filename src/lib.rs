pub mod disc;
pub mod error;
pub mod euler;
pub mod initialization;
pub mod io;
pub mod solver;
pub mod temporal_disc;
