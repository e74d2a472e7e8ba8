// One-slot cross-core mailbox with latest-wins semantics
//
// The sensor core commits one payload per classifier decision; the network
// core reads whenever its publish cadence comes around. There is no queue
// and no backpressure: an unread payload is simply overwritten. A sequence
// counter (odd while a write is in flight) plus release/acquire ordering
// guarantees the consumer never observes a torn payload.

use core::cell::UnsafeCell;
use core::sync::atomic::{fence, AtomicBool, AtomicU32, Ordering};

use heapless::String;

/// Maximum label length carried across the core boundary.
pub const LABEL_CAPACITY: usize = 31;

/// The single datum that crosses the core boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IpcPayload {
    pub label_id: u8,
    pub label: String<LABEL_CAPACITY>,
    pub confidence: f32,
}

impl IpcPayload {
    pub fn new(label_id: u8, label: &str, confidence: f32) -> Self {
        let mut bounded = String::new();
        // Truncate rather than fail; labels longer than the slot are a
        // catalog bug, not a runtime condition.
        for ch in label.chars() {
            if bounded.push(ch).is_err() {
                break;
            }
        }
        Self {
            label_id,
            label: bounded,
            confidence,
        }
    }

    /// True when the payload names an event rather than the negative class.
    pub fn is_event(&self) -> bool {
        self.label_id > 0
    }
}

/// Fixed-layout copy of the payload stored in the shared slot. Plain old
/// data so a torn read is at worst garbage bytes that the sequence check
/// discards before anyone looks at them.
#[derive(Clone, Copy)]
struct Slot {
    label_id: u8,
    label_len: u8,
    label: [u8; LABEL_CAPACITY],
    confidence: f32,
}

impl Slot {
    const EMPTY: Slot = Slot {
        label_id: 0,
        label_len: 0,
        label: [0; LABEL_CAPACITY],
        confidence: 0.0,
    };

    fn encode(payload: &IpcPayload) -> Slot {
        let mut slot = Slot::EMPTY;
        slot.label_id = payload.label_id;
        let bytes = payload.label.as_bytes();
        let len = bytes.len().min(LABEL_CAPACITY);
        slot.label[..len].copy_from_slice(&bytes[..len]);
        slot.label_len = len as u8;
        slot.confidence = payload.confidence;
        slot
    }

    fn decode(&self) -> IpcPayload {
        let len = (self.label_len as usize).min(LABEL_CAPACITY);
        let text = core::str::from_utf8(&self.label[..len]).unwrap_or("");
        IpcPayload::new(self.label_id, text, self.confidence)
    }
}

/// Single-slot mailbox shared between the two cores.
///
/// Producer side is wait-free: one sequence bump, one slot write, one
/// sequence bump, one flag store. Consumer side retries only while a write
/// is in flight on the other core, which is bounded by the producer's slot
/// copy.
pub struct IpcMailbox {
    seq: AtomicU32,
    fresh: AtomicBool,
    committed: AtomicBool,
    slot: UnsafeCell<Slot>,
}

// Safety: the slot is only written between an odd and even sequence value
// by the single producer, and readers validate the sequence around their
// copy, discarding anything observed during a write.
unsafe impl Sync for IpcMailbox {}
unsafe impl Send for IpcMailbox {}

impl IpcMailbox {
    pub const fn new() -> Self {
        Self {
            seq: AtomicU32::new(0),
            fresh: AtomicBool::new(false),
            committed: AtomicBool::new(false),
            slot: UnsafeCell::new(Slot::EMPTY),
        }
    }

    /// Commit a payload from the sensor core. Wait-free; overwrites any
    /// unread previous payload.
    pub fn producer_commit(&self, payload: &IpcPayload) {
        let slot = Slot::encode(payload);
        // Odd sequence marks the write window; Acquire keeps the slot
        // store from floating above it.
        let s = self.seq.fetch_add(1, Ordering::Acquire);
        unsafe {
            core::ptr::write_volatile(self.slot.get(), slot);
        }
        // Even again; Release publishes the slot bytes before the counter.
        self.seq.store(s.wrapping_add(2), Ordering::Release);
        self.fresh.store(true, Ordering::Release);
        self.committed.store(true, Ordering::Release);
    }

    /// Read the most recent committed payload into `out`, clearing the
    /// new-data flag. Returns false only while nothing has ever been
    /// committed; after the first commit it always yields the latest value.
    pub fn consumer_try_take(&self, out: &mut IpcPayload) -> bool {
        if !self.committed.load(Ordering::Acquire) {
            return false;
        }
        self.fresh.store(false, Ordering::Release);
        *out = self.read_coherent().decode();
        true
    }

    /// Whether a payload has ever been committed. Used on the network core
    /// to hold off cloud bring-up until the sensor core is alive.
    pub fn consumer_has_received_any(&self) -> bool {
        self.committed.load(Ordering::Acquire)
    }

    /// Whether a commit happened since the last `consumer_try_take`.
    pub fn has_fresh(&self) -> bool {
        self.fresh.load(Ordering::Acquire)
    }

    fn read_coherent(&self) -> Slot {
        loop {
            let s1 = self.seq.load(Ordering::Acquire);
            if s1 & 1 == 1 {
                core::hint::spin_loop();
                continue;
            }
            let copy = unsafe { core::ptr::read_volatile(self.slot.get()) };
            fence(Ordering::Acquire);
            let s2 = self.seq.load(Ordering::Relaxed);
            if s1 == s2 {
                return copy;
            }
        }
    }
}

impl Default for IpcMailbox {
    fn default() -> Self {
        Self::new()
    }
}
