//! Whole pipeline tests on synthetic station days.
mod pipeline;
