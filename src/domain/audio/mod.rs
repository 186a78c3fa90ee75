//! PCM interchange format used between synthesis, concatenation and bumper injection.
//!
//! Every stage that needs a codec-aware merge decodes to interleaved 16-bit PCM,
//! converts to a common [`AudioSpec`], and encodes to WAV exactly once.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("wav codec error: {0}")]
    Codec(#[from] hound::Error),
    #[error("unsupported sample format: {0}")]
    Unsupported(String),
    #[error("no audio streams to merge")]
    Empty,
}

/// Encoding detected from the leading bytes of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEncoding {
    Wav,
    Mpeg,
    Unknown,
}

impl AudioEncoding {
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
            AudioEncoding::Wav
        } else if bytes.starts_with(b"ID3") || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0) {
            AudioEncoding::Mpeg
        } else {
            AudioEncoding::Unknown
        }
    }

    /// Whether raw byte append of two streams in this encoding stays playable
    pub fn tolerates_raw_concatenation(&self) -> bool {
        matches!(self, AudioEncoding::Mpeg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Decoded interleaved 16-bit PCM
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    spec: AudioSpec,
    samples: Vec<i16>,
}

impl PcmAudio {
    pub fn new(spec: AudioSpec, samples: Vec<i16>) -> Self {
        Self { spec, samples }
    }

    /// Wrap raw signed little-endian 16-bit PCM as returned by speech providers
    pub fn from_pcm16_le(bytes: &[u8], spec: AudioSpec) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self { spec, samples }
    }

    pub fn decode_wav(bytes: &[u8]) -> Result<Self, AudioError> {
        let reader = WavReader::new(Cursor::new(bytes))?;
        let wav_spec = reader.spec();
        if wav_spec.channels == 0 {
            return Err(AudioError::Unsupported("zero channels".to_string()));
        }

        let samples: Vec<i16> = match (wav_spec.sample_format, wav_spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader.into_samples::<i16>().collect::<Result<_, _>>()?,
            (SampleFormat::Int, bits) if bits <= 32 => {
                let shift = i32::from(bits) - 16;
                reader
                    .into_samples::<i32>()
                    .map(|s| {
                        s.map(|v| {
                            if shift >= 0 {
                                (v >> shift) as i16
                            } else {
                                (v << -shift) as i16
                            }
                        })
                    })
                    .collect::<Result<_, _>>()?
            }
            (SampleFormat::Float, 32) => reader
                .into_samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16))
                .collect::<Result<_, _>>()?,
            (format, bits) => {
                return Err(AudioError::Unsupported(format!("{:?} {}-bit", format, bits)));
            }
        };

        Ok(Self {
            spec: AudioSpec {
                sample_rate: wav_spec.sample_rate,
                channels: wav_spec.channels,
            },
            samples,
        })
    }

    pub fn encode_wav(&self) -> Result<Vec<u8>, AudioError> {
        let wav_spec = WavSpec {
            channels: self.spec.channels,
            sample_rate: self.spec.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(44 + self.samples.len() * 2));
        {
            let mut writer = WavWriter::new(&mut cursor, wav_spec)?;
            for sample in &self.samples {
                writer.write_sample(*sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    pub fn spec(&self) -> AudioSpec {
        self.spec
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.spec.channels.max(1))
    }

    pub fn duration_secs(&self) -> f64 {
        if self.spec.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.spec.sample_rate)
    }

    /// Append another stream, converting it to this stream's spec first
    pub fn append(&mut self, other: PcmAudio) {
        let other = other.convert(self.spec);
        self.samples.extend_from_slice(&other.samples);
    }

    pub fn convert(self, target: AudioSpec) -> PcmAudio {
        if self.spec == target {
            return self;
        }
        let remixed = self.remix(target.channels);
        remixed.resample(target.sample_rate)
    }

    fn remix(self, channels: u16) -> PcmAudio {
        let from = usize::from(self.spec.channels.max(1));
        let to = usize::from(channels.max(1));
        if from == to {
            return self;
        }

        let mono: Vec<i16> = if from == 1 {
            self.samples
        } else {
            self.samples
                .chunks_exact(from)
                .map(|frame| {
                    let sum: i32 = frame.iter().map(|s| i32::from(*s)).sum();
                    (sum / from as i32) as i16
                })
                .collect()
        };

        let samples = if to == 1 {
            mono
        } else {
            mono.iter()
                .flat_map(|s| std::iter::repeat(*s).take(to))
                .collect()
        };

        PcmAudio {
            spec: AudioSpec {
                sample_rate: self.spec.sample_rate,
                channels,
            },
            samples,
        }
    }

    fn resample(self, sample_rate: u32) -> PcmAudio {
        if self.spec.sample_rate == sample_rate || self.spec.sample_rate == 0 || sample_rate == 0 {
            return PcmAudio {
                spec: AudioSpec {
                    sample_rate,
                    channels: self.spec.channels,
                },
                samples: self.samples,
            };
        }

        let channels = usize::from(self.spec.channels.max(1));
        let in_frames = self.frames();
        let out_frames =
            (in_frames as u64 * u64::from(sample_rate) / u64::from(self.spec.sample_rate)) as usize;
        let step = f64::from(self.spec.sample_rate) / f64::from(sample_rate);

        let mut samples = Vec::with_capacity(out_frames * channels);
        for frame in 0..out_frames {
            let position = frame as f64 * step;
            let left = position.floor() as usize;
            let right = (left + 1).min(in_frames.saturating_sub(1));
            let weight = position - left as f64;
            for channel in 0..channels {
                let a = f64::from(self.samples[left * channels + channel]);
                let b = f64::from(self.samples[right * channels + channel]);
                samples.push((a + (b - a) * weight).round() as i16);
            }
        }

        PcmAudio {
            spec: AudioSpec {
                sample_rate,
                channels: self.spec.channels,
            },
            samples,
        }
    }
}

/// Duration of an encoded WAV buffer without decoding its samples
pub fn wav_duration_secs(bytes: &[u8]) -> Option<f64> {
    let reader = WavReader::new(Cursor::new(bytes)).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

/// Decode every stream, join them in order in the first stream's spec, and encode once
pub fn merge_wav<'a, I>(parts: I) -> Result<Vec<u8>, AudioError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut accumulator: Option<PcmAudio> = None;
    for part in parts {
        let decoded = PcmAudio::decode_wav(part)?;
        match accumulator.as_mut() {
            Some(acc) => acc.append(decoded),
            None => accumulator = Some(decoded),
        }
    }
    accumulator.ok_or(AudioError::Empty)?.encode_wav()
}
