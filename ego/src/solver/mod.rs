mod egor_config;
mod egor_solver;
mod egor_state;
mod solver_impl;
mod solver_infill_optim;

pub use egor_config::*;
pub use egor_solver::*;
pub use egor_state::*;
