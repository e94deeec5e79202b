/// Sound engine: procedural chimes for board actions via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = 2.0 * std::f32::consts::PI;

    /// Pre-generated WAV buffers for each chime.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_select: Arc<Vec<u8>>,
        sfx_swap: Arc<Vec<u8>>,
        sfx_correct: Arc<Vec<u8>>,
        sfx_wrong: Arc<Vec<u8>>,
        sfx_lost: Arc<Vec<u8>>,
        sfx_reveal: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(error = %e, "no audio output device, chimes disabled");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_select: Arc::new(make_wav(&gen_blip(880.0, 0.05, 0.2))),
                sfx_swap: Arc::new(make_wav(&gen_swap())),
                sfx_correct: Arc::new(make_wav(&gen_correct())),
                sfx_wrong: Arc::new(make_wav(&gen_wrong())),
                sfx_lost: Arc::new(make_wav(&gen_lost())),
                sfx_reveal: Arc::new(make_wav(&gen_reveal())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_select(&self) { self.play(&self.sfx_select); }
        pub fn play_swap(&self) { self.play(&self.sfx_swap); }
        pub fn play_correct(&self) { self.play(&self.sfx_correct); }
        pub fn play_wrong(&self) { self.play(&self.sfx_wrong); }
        pub fn play_lost(&self) { self.play(&self.sfx_lost); }
        pub fn play_reveal(&self) { self.play(&self.sfx_reveal); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Simple sine blip at given frequency and duration
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32); // linear fade out
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Sequence of notes, each with a soft decay and a touch of 2nd harmonic.
    fn gen_notes(notes: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 2.0 * TAU).sin() * 0.25;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Swap: two quick notes, a fifth apart
    fn gen_swap() -> Vec<f32> {
        gen_notes(&[(660.0, 0.045), (990.0, 0.06)], 0.22)
    }

    /// Correct order: ascending fanfare C5→E5→G5→C6 with a held top note
    fn gen_correct() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0];
        let note_dur = 0.1;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = (t * freq * TAU).sin() * 0.6
                    + (t * freq * 2.0 * TAU).sin() * 0.3
                    + (t * freq * 3.0 * TAU).sin() * 0.1;
                samples.push(wave * env * 0.3);
            }
        }
        let last_freq = 1047.0_f32;
        let n = (SAMPLE_RATE as f32 * 0.25) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            samples.push((t * last_freq * TAU).sin() * env * 0.3);
        }
        samples
    }

    /// Wrong order: low two-note buzz
    fn gen_wrong() -> Vec<f32> {
        let notes = [(220.0_f32, 0.09), (185.0, 0.14)];
        let mut samples = Vec::new();
        for &(freq, dur) in &notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.8);
                // Square-ish for a harsher edge
                let s = (t * freq * TAU).sin();
                let wave = s.signum() * 0.4 + s * 0.6;
                samples.push(wave * env * 0.2);
            }
        }
        samples
    }

    /// Out of attempts: sad descending tone A4→F#4→Eb4→C4
    fn gen_lost() -> Vec<f32> {
        let notes = [440.0_f32, 370.0, 311.0, 261.0];
        let note_dur = 0.12;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                samples.push((t * freq * TAU).sin() * env * 0.3);
            }
        }
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    /// Reveal: gentle rising arpeggio as tiles slide into place
    fn gen_reveal() -> Vec<f32> {
        gen_notes(&[(392.0, 0.07), (494.0, 0.07), (587.0, 0.07), (784.0, 0.16)], 0.2)
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_sizes_match_payload() {
            let samples = gen_swap();
            let wav = make_wav(&samples);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
            assert_eq!(data_size as usize, samples.len() * 2);
        }

        #[test]
        fn chimes_stay_in_range() {
            for s in [gen_correct(), gen_wrong(), gen_lost(), gen_reveal()] {
                assert!(!s.is_empty());
                assert!(s.iter().all(|v| v.abs() <= 1.0));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_select(&self) {}
    pub fn play_swap(&self) {}
    pub fn play_correct(&self) {}
    pub fn play_wrong(&self) {}
    pub fn play_lost(&self) {}
    pub fn play_reveal(&self) {}
}
