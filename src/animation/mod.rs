//! Spring physics for carrying the sheet to its snap points.
//!
//! The integrator is frame driven: the owner calls
//! [`SpringIntegrator::tick`] once per frame and stops requesting frames
//! when it reports [`SpringStatus::Settled`].

mod spring;

pub use spring::{MotionState, SpringConfig, SpringIntegrator, SpringStatus};
