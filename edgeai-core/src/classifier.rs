// Black-box classifier contract and the deterministic doubles used when
// the vendor library is not linked in.
//
// The vendor runtime exposes a C surface: feed feature values with
// enqueue, poll decisions with dequeue, tune postprocessing with a
// sensitivity record. Everything above it is written against the trait so
// the library can be swapped for a double on the host and in default
// firmware builds.

use crate::labels::ModelKind;

/// Vendor status codes, one per return value of the C surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NoData,
    NoMem,
    TimedOut,
    OutOfBounds,
}

impl Status {
    /// Map a raw vendor return code.
    pub fn from_code(code: i32) -> Status {
        match code {
            0 => Status::Ok,
            -1 => Status::NoData,
            -2 => Status::NoMem,
            -3 => Status::TimedOut,
            _ => Status::OutOfBounds,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::NoData => -1,
            Status::NoMem => -2,
            Status::TimedOut => -3,
            Status::OutOfBounds => -4,
        }
    }
}

/// Postprocessing knob mirrored from the vendor's PP record. Only the
/// confidence threshold is guaranteed to change behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    pub confidence: f32,
    pub average: u8,
    pub subsequent: u8,
    pub pool: u8,
    pub pool_selection: u8,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            confidence: 0.7,
            average: 1,
            subsequent: 1,
            pool: 1,
            pool_selection: 0,
        }
    }
}

/// The enqueue/dequeue contract every backend implements.
pub trait Classifier: Send {
    /// Feature values consumed per enqueue call.
    fn inputs_per_step(&self) -> usize;

    /// Number of output classes, negative class included.
    fn class_count(&self) -> usize;

    /// Feed one step of features.
    fn enqueue(&mut self, features: &[f32]) -> Status;

    /// Poll for a decision. On `Ok` each entry of `out_flags` is 0 or 1.
    fn dequeue(&mut self, out_flags: &mut [i32]) -> Status;

    /// Apply the postprocessing knob. Backends without one accept and
    /// ignore it.
    fn set_sensitivity(&mut self, sensitivity: &Sensitivity) -> Status {
        let _ = sensitivity;
        Status::Ok
    }

    /// Confidence attached to the most recent decision. The vendor surface
    /// only exposes flags, so backends default to full confidence.
    fn last_confidence(&self) -> f32 {
        1.0
    }
}

/// Pick the class index from a dequeued flag vector: the last index whose
/// flag is set, with 0 (the negative class) when nothing is set.
pub fn decide_label(flags: &[i32]) -> usize {
    let mut chosen = 0;
    for (i, &flag) in flags.iter().enumerate() {
        if flag == 1 {
            chosen = i;
        }
    }
    chosen
}

/// Windowed-energy double: accumulates squared feature values over a fixed
/// number of steps and flags class 1 when the window RMS crosses the
/// threshold. Deterministic, allocation-free after construction.
pub struct EnergyClassifier {
    inputs_per_step: usize,
    classes: usize,
    window_steps: usize,
    threshold: f32,
    accum: f64,
    steps: usize,
    decision: Option<usize>,
    confidence: f32,
}

impl EnergyClassifier {
    pub fn new(
        inputs_per_step: usize,
        classes: usize,
        window_steps: usize,
        threshold: f32,
    ) -> Self {
        Self {
            inputs_per_step,
            classes,
            window_steps,
            threshold,
            accum: 0.0,
            steps: 0,
            decision: None,
            confidence: 1.0,
        }
    }

    /// Window length and threshold tuned per model family so default
    /// builds behave sensibly on real input.
    pub fn for_model(model: ModelKind) -> Self {
        match model {
            ModelKind::Cough | ModelKind::Alarm | ModelKind::BabyCry => {
                Self::new(1, 2, crate::audio::FRAME_SIZE, 0.1)
            }
            ModelKind::DirectionOfArrival => Self::new(4, 9, 64, 0.1),
            ModelKind::FallDetection => Self::new(3, 2, 25, 1.0),
            ModelKind::Gesture => Self::new(5, 6, 1, 1.5),
        }
    }
}

impl Classifier for EnergyClassifier {
    fn inputs_per_step(&self) -> usize {
        self.inputs_per_step
    }

    fn class_count(&self) -> usize {
        self.classes
    }

    fn enqueue(&mut self, features: &[f32]) -> Status {
        if features.len() != self.inputs_per_step {
            return Status::OutOfBounds;
        }
        for &f in features {
            self.accum += f as f64 * f as f64;
        }
        self.steps += 1;
        if self.steps >= self.window_steps {
            let count = (self.steps * self.inputs_per_step) as f64;
            let rms = libm::sqrt(self.accum / count) as f32;
            self.confidence = (rms / self.threshold).min(1.0);
            self.decision = Some(if rms >= self.threshold { 1 } else { 0 });
            self.accum = 0.0;
            self.steps = 0;
        }
        Status::Ok
    }

    fn dequeue(&mut self, out_flags: &mut [i32]) -> Status {
        if out_flags.len() < self.classes {
            return Status::OutOfBounds;
        }
        match self.decision.take() {
            Some(class) => {
                for f in out_flags.iter_mut() {
                    *f = 0;
                }
                out_flags[class.min(self.classes - 1)] = 1;
                Status::Ok
            }
            None => Status::NoData,
        }
    }

    fn set_sensitivity(&mut self, sensitivity: &Sensitivity) -> Status {
        // The double treats the confidence threshold as its RMS threshold,
        // which keeps the knob observable in tests.
        if sensitivity.confidence <= 0.0 {
            return Status::OutOfBounds;
        }
        self.threshold = sensitivity.confidence;
        Status::Ok
    }

    fn last_confidence(&self) -> f32 {
        self.confidence
    }
}

/// One scripted dequeue result.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedStep {
    pub status: Status,
    pub class: Option<usize>,
}

/// Playback double: returns a fixed sequence of statuses and decisions.
/// Used to exercise the timeout and overload paths and the fixture replay.
pub struct ScriptedClassifier {
    inputs_per_step: usize,
    classes: usize,
    dequeue_script: Vec<ScriptedStep>,
    dequeue_cursor: usize,
    enqueue_script: Vec<Status>,
    enqueue_cursor: usize,
}

impl ScriptedClassifier {
    pub fn new(inputs_per_step: usize, classes: usize) -> Self {
        Self {
            inputs_per_step,
            classes,
            dequeue_script: Vec::new(),
            dequeue_cursor: 0,
            enqueue_script: Vec::new(),
            enqueue_cursor: 0,
        }
    }

    pub fn push_dequeue(mut self, status: Status, class: Option<usize>) -> Self {
        self.dequeue_script.push(ScriptedStep { status, class });
        self
    }

    pub fn push_enqueue(mut self, status: Status) -> Self {
        self.enqueue_script.push(status);
        self
    }
}

impl Classifier for ScriptedClassifier {
    fn inputs_per_step(&self) -> usize {
        self.inputs_per_step
    }

    fn class_count(&self) -> usize {
        self.classes
    }

    fn enqueue(&mut self, features: &[f32]) -> Status {
        if features.len() != self.inputs_per_step {
            return Status::OutOfBounds;
        }
        match self.enqueue_script.get(self.enqueue_cursor) {
            Some(&status) => {
                self.enqueue_cursor += 1;
                status
            }
            None => Status::Ok,
        }
    }

    fn dequeue(&mut self, out_flags: &mut [i32]) -> Status {
        if out_flags.len() < self.classes {
            return Status::OutOfBounds;
        }
        let step = match self.dequeue_script.get(self.dequeue_cursor) {
            Some(step) => *step,
            None => return Status::NoData,
        };
        self.dequeue_cursor += 1;
        if step.status == Status::Ok {
            for f in out_flags.iter_mut() {
                *f = 0;
            }
            if let Some(class) = step.class {
                out_flags[class.min(self.classes - 1)] = 1;
            }
        }
        step.status
    }
}
