// src/detection/mod.rs

mod rep_counter;
mod state_machine;

// Re-export public APIs
pub use rep_counter::{PhaseTransition, RepCounter, RepUpdate, SessionState, SessionStatistics};
pub use state_machine::{
    next_transition, PhaseStateMachine, RepCycle, Transition, JUMP_SETTLE_EPSILON,
};
