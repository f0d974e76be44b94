//! Command implementations for fieldstats-cmd

pub mod encode;
pub mod evaluate;
pub mod inspect;
