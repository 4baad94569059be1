//! Procedural sound cues via rodio.
//!
//! Every cue is synthesized into an in-memory WAV buffer once at startup;
//! playback detaches a Sink and never blocks the frame loop.
//!
//! Without the "sound" feature `SoundEngine` is a stub whose methods do nothing.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_pick: Arc<Vec<u8>>,
        sfx_match: Arc<Vec<u8>>,
        sfx_undo: Arc<Vec<u8>>,
        sfx_level: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
        sfx_deadlock: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_pick: Arc::new(make_wav(&gen_pick())),
                sfx_match: Arc::new(make_wav(&gen_match())),
                sfx_undo: Arc::new(make_wav(&gen_undo())),
                sfx_level: Arc::new(make_wav(&gen_level_clear())),
                sfx_win: Arc::new(make_wav(&gen_game_clear())),
                sfx_deadlock: Arc::new(make_wav(&gen_deadlock())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            let cursor = Cursor::new(buf.as_ref().clone());
            if let Ok(src) = rodio::Decoder::new(cursor) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_pick(&self) { self.play(&self.sfx_pick); }
        pub fn play_match(&self) { self.play(&self.sfx_match); }
        pub fn play_undo(&self) { self.play(&self.sfx_undo); }
        pub fn play_level_clear(&self) { self.play(&self.sfx_level); }
        pub fn play_game_clear(&self) { self.play(&self.sfx_win); }
        pub fn play_deadlock(&self) { self.play(&self.sfx_deadlock); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    /// One tone with a fundamental plus weighted overtones and a decay envelope.
    fn tone(freq: f32, duration: f32, overtones: &[(f32, f32)], decay: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * decay;
                let wave: f32 = overtones
                    .iter()
                    .map(|&(mult, weight)| (t * freq * mult * TAU).sin() * weight)
                    .sum();
                wave * env * volume
            })
            .collect()
    }

    fn sequence(notes: &[f32], note_dur: f32, overtones: &[(f32, f32)], volume: f32) -> Vec<f32> {
        notes
            .iter()
            .flat_map(|&f| tone(f, note_dur, overtones, 0.4, volume))
            .collect()
    }

    /// Card lands in a slot: a short soft click.
    fn gen_pick() -> Vec<f32> {
        tone(880.0, 0.04, &[(1.0, 0.8), (2.0, 0.2)], 1.0, 0.2)
    }

    /// Triple cleared: quick rising arpeggio E6, G6, C7.
    fn gen_match() -> Vec<f32> {
        sequence(&[1319.0, 1568.0, 2093.0], 0.05, &[(1.0, 0.7), (3.0, 0.3)], 0.22)
    }

    /// Undo: two falling notes.
    fn gen_undo() -> Vec<f32> {
        sequence(&[660.0, 494.0], 0.05, &[(1.0, 1.0)], 0.2)
    }

    /// Level cleared: C5, E5, G5, C6 fanfare with the top note held.
    fn gen_level_clear() -> Vec<f32> {
        let bright = [(1.0, 0.6), (2.0, 0.3), (3.0, 0.1)];
        let mut samples = sequence(&[523.0, 659.0, 784.0, 1047.0], 0.1, &bright, 0.3);
        samples.extend(tone(1047.0, 0.25, &[(1.0, 1.0)], 1.0, 0.3));
        samples
    }

    /// Whole game cleared: the level fanfare twice, the second an octave up.
    fn gen_game_clear() -> Vec<f32> {
        let bright = [(1.0, 0.6), (2.0, 0.3), (3.0, 0.1)];
        let mut samples = sequence(&[523.0, 659.0, 784.0], 0.09, &bright, 0.3);
        samples.extend(sequence(&[1047.0, 1319.0, 1568.0], 0.09, &bright, 0.3));
        samples.extend(tone(2093.0, 0.4, &[(1.0, 0.8), (2.0, 0.2)], 1.0, 0.3));
        samples
    }

    /// Bar jammed: slow descending minor line with a tail fade.
    fn gen_deadlock() -> Vec<f32> {
        let mut samples = sequence(&[440.0, 370.0, 311.0, 261.0], 0.12, &[(1.0, 1.0)], 0.3);
        let total = samples.len();
        let fade_len = total / 4;
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit PCM mono
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_pick(&self) {}
    pub fn play_match(&self) {}
    pub fn play_undo(&self) {}
    pub fn play_level_clear(&self) {}
    pub fn play_game_clear(&self) {}
    pub fn play_deadlock(&self) {}
}
