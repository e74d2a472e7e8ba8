// Double-buffered frame assembly for the capture path
//
// The producer (interrupt context or the capture loop consuming the vendor
// DMA driver) feeds fixed-size chunks; the assembler fills the active
// buffer at the running offset and swaps buffers exactly once per completed
// frame. The consumer only ever touches the full buffer, so a frame is
// never read while it is being written.

/// Two equally sized frame buffers plus the bookkeeping to alternate them.
///
/// `CHUNK` is the number of samples delivered per data-ready event and
/// `FRAME` the samples per completed frame; `FRAME` must be a multiple of
/// `CHUNK`. Only the producer calls `push_chunk`, and only the producer
/// swaps, which keeps the active and full buffers disjoint at all times.
pub struct FrameAssembler<T, const CHUNK: usize, const FRAME: usize> {
    buffers: [[T; FRAME]; 2],
    active: usize,
    chunk_counter: usize,
    frames_completed: u32,
    overruns: u32,
}

/// Handed out when a frame completes; names the buffer the consumer owns
/// until the next completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReady {
    pub buffer_index: usize,
    pub sequence: u32,
}

impl<T: Copy + Default, const CHUNK: usize, const FRAME: usize>
    FrameAssembler<T, CHUNK, FRAME>
{
    pub const CHUNKS_PER_FRAME: usize = FRAME / CHUNK;

    pub fn new() -> Self {
        debug_assert!(FRAME % CHUNK == 0);
        Self {
            buffers: [[T::default(); FRAME]; 2],
            active: 0,
            chunk_counter: 0,
            frames_completed: 0,
            overruns: 0,
        }
    }

    /// Producer side: copy one chunk into the active buffer at the running
    /// offset. Returns `Some` exactly once per completed frame, after the
    /// buffer swap, so the caller can raise its one-shot notification.
    ///
    /// Never allocates and never blocks.
    #[inline]
    pub fn push_chunk(&mut self, chunk: &[T; CHUNK]) -> Option<FrameReady> {
        let offset = self.chunk_counter * CHUNK;
        self.buffers[self.active][offset..offset + CHUNK].copy_from_slice(chunk);
        self.chunk_counter += 1;

        if self.chunk_counter >= Self::CHUNKS_PER_FRAME {
            // Ownership transfer: the buffer we just finished becomes the
            // full buffer, the previous full buffer becomes active.
            let finished = self.active;
            self.active ^= 1;
            self.chunk_counter = 0;
            self.frames_completed = self.frames_completed.wrapping_add(1);
            return Some(FrameReady {
                buffer_index: finished,
                sequence: self.frames_completed,
            });
        }
        None
    }

    /// Producer side: the hardware reported overflow or underflow. The
    /// error is cleared upstream; here we only count it. The frame in
    /// flight keeps filling and is implicitly stale.
    #[inline]
    pub fn record_overrun(&mut self) {
        self.overruns = self.overruns.wrapping_add(1);
    }

    /// Consumer side: borrow a completed frame by index.
    pub fn frame(&self, ready: FrameReady) -> &[T; FRAME] {
        &self.buffers[ready.buffer_index]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn frames_completed(&self) -> u32 {
        self.frames_completed
    }

    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

impl<T: Copy + Default, const CHUNK: usize, const FRAME: usize> Default
    for FrameAssembler<T, CHUNK, FRAME>
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type PdmAssembler = FrameAssembler<i16, 32, 1024>;

    #[test]
    fn one_completion_per_frame() {
        let mut asm = PdmAssembler::new();
        let chunk = [7i16; 32];

        for event in 0..PdmAssembler::CHUNKS_PER_FRAME - 1 {
            assert_eq!(asm.push_chunk(&chunk), None, "event {event}");
        }
        let ready = asm.push_chunk(&chunk).unwrap();
        assert_eq!(ready.sequence, 1);
        assert_eq!(asm.frames_completed(), 1);

        // The full buffer is the one that was just written, and the
        // producer moved on to the other one.
        assert_ne!(ready.buffer_index, asm.active_index());
    }

    #[test]
    fn chunks_land_at_their_offset() {
        let mut asm: FrameAssembler<i16, 4, 16> = FrameAssembler::new();
        let mut ready = None;
        for i in 0..4u16 {
            let chunk = [i as i16; 4];
            ready = asm.push_chunk(&chunk).or(ready);
        }
        let ready = ready.unwrap();
        let frame = asm.frame(ready);
        assert_eq!(&frame[0..4], &[0, 0, 0, 0]);
        assert_eq!(&frame[4..8], &[1, 1, 1, 1]);
        assert_eq!(&frame[12..16], &[3, 3, 3, 3]);
    }

    #[test]
    fn full_frame_is_never_the_active_frame() {
        let mut asm: FrameAssembler<i16, 4, 16> = FrameAssembler::new();
        let mut last_ready = None;
        for i in 0..64i16 {
            if let Some(ready) = asm.push_chunk(&[i; 4]) {
                assert_ne!(ready.buffer_index, asm.active_index());
                last_ready = Some(ready);
            }
        }
        // 64 chunks of 4 over a 16-sample frame is 16 completed frames,
        // alternating buffers every time.
        assert_eq!(asm.frames_completed(), 16);
        assert_eq!(last_ready.unwrap().sequence, 16);
    }

    #[test]
    fn completed_frame_stays_stable_while_next_fills() {
        let mut asm: FrameAssembler<i16, 4, 8> = FrameAssembler::new();
        asm.push_chunk(&[1; 4]);
        let ready = asm.push_chunk(&[2; 4]).unwrap();
        let snapshot = *asm.frame(ready);

        // Fill most of the next frame; the completed one must not move.
        asm.push_chunk(&[9; 4]);
        assert_eq!(*asm.frame(ready), snapshot);
    }

    #[test]
    fn overruns_count_without_disturbing_cadence() {
        let mut asm: FrameAssembler<i16, 4, 8> = FrameAssembler::new();
        asm.push_chunk(&[1; 4]);
        asm.record_overrun();
        assert_eq!(asm.overruns(), 1);
        assert!(asm.push_chunk(&[2; 4]).is_some());
    }
}
