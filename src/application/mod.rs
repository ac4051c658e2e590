pub mod assembler;
pub mod cleaner;
pub mod export;
pub mod indicators;
pub mod pipeline;
pub mod predictor;
