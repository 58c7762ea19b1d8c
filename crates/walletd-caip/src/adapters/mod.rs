//! Provider-specific identifier tables

pub mod onramper;
