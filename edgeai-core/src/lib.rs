//! Edge AI Core - Hardware-independent logic for the dual-core sensor node
//!
//! This crate contains the parts of the firmware that can be tested on the
//! host platform without the target hardware: sample conditioning, the radar
//! feature extraction pipeline, the frame assembler, the cross-core mailbox,
//! the classifier contract, the command grammar and the telemetry schema.

pub mod audio;
pub mod capture;
pub mod classifier;
pub mod command;
pub mod doa;
pub mod ipc;
pub mod labels;
pub mod motion;
pub mod radar;
pub mod telemetry;

#[cfg(test)]
mod tests {
    use crate::labels::ModelKind;

    #[test]
    fn every_model_has_a_negative_class() {
        for model in ModelKind::ALL {
            assert_eq!(model.symbols()[0], "unlabelled");
        }
    }
}
