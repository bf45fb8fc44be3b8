pub mod report;
pub mod sequencer;
