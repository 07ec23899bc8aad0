//! Priority-ordered course registration: an intake queue feeding a greedy
//! allocator that gives each course one room and one weekly time slot.

pub mod catalog;
pub mod config;
pub mod conflict;
pub mod data;
pub mod error;
pub mod queue;
pub mod report;
pub mod server;
pub mod solver;
