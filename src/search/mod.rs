//! Evaluation, move ordering, transposition table, and the search driver.

pub mod context;
pub mod eval;
pub mod ordering;
pub mod search;
pub mod see;
pub mod tt;
