// Canned four-microphone capture for the direction-of-arrival model
//
// Bench bring-up runs this recording when no microphone array is fitted.
// The rows replay through the inference path exactly like live steps. The
// capture was taken with the source due south of the array, so a correct
// replay classifies as "S".

use crate::classifier::{decide_label, Classifier, ScriptedClassifier, Status};
use crate::labels::ModelKind;

/// One normalized sample per array microphone, ordered
/// [north, east, south, west].
pub const DOA_FIXTURE: [[f32; 4]; 16] = [
    [0.031, -0.044, 0.162, -0.027],
    [-0.058, 0.071, -0.233, 0.049],
    [0.084, -0.096, 0.301, -0.066],
    [-0.102, 0.088, -0.342, 0.079],
    [0.097, -0.075, 0.355, -0.081],
    [-0.079, 0.061, -0.318, 0.068],
    [0.055, -0.049, 0.264, -0.052],
    [-0.036, 0.038, -0.199, 0.031],
    [0.024, -0.029, 0.147, -0.018],
    [-0.041, 0.052, -0.212, 0.037],
    [0.069, -0.081, 0.287, -0.058],
    [-0.091, 0.077, -0.326, 0.071],
    [0.086, -0.064, 0.309, -0.069],
    [-0.062, 0.047, -0.255, 0.051],
    [0.039, -0.033, 0.188, -0.034],
    [-0.021, 0.026, -0.124, 0.019],
];

/// Class the recording must resolve to.
pub const EXPECTED_CLASS: usize = 2;
pub const EXPECTED_SYMBOL: &str = "S";

/// Feature rows in replay order.
pub fn steps() -> impl Iterator<Item = &'static [f32; 4]> {
    DOA_FIXTURE.iter()
}

/// Replay the capture through a classifier and return the decided class,
/// polling after every step the way the live loop does.
pub fn replay<C: Classifier>(classifier: &mut C) -> Option<usize> {
    let mut flags = vec![0i32; classifier.class_count()];
    let mut decided = None;
    for row in steps() {
        if classifier.enqueue(row.as_slice()) != Status::Ok {
            return decided;
        }
        match classifier.dequeue(&mut flags) {
            Status::Ok => decided = Some(decide_label(&flags)),
            Status::NoData => continue,
            _ => return decided,
        }
    }
    decided
}
