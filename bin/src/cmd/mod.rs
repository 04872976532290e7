//! CLI subcommand modules.
//!
//! This module contains the implementations for all sentcast CLI subcommands.

pub(crate) mod compare;
pub(crate) mod evaluate;
pub(crate) mod feature_sets;
pub(crate) mod features;
pub(crate) mod merge;
pub(crate) mod run;
pub(crate) mod sentiment;
pub(crate) mod train;
pub(crate) mod tune;
