//! Модуль для работы с аудио
//!
//! Кодирование сырых PCM данных (16 бит, моно) в WAV контейнер и
//! регулировка громкости с ограничением амплитуды.

use bytes::{BufMut, BytesMut};

/// Частота дискретизации озвучки, которую возвращает провайдер
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Размер канонического заголовка WAV
pub const WAV_HEADER_LEN: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;

/// Упаковать PCM данные в WAV контейнер
///
/// Заголовок всегда 44 байта, данные копируются без выравнивания.
/// Размерные поля 32-битные: значения, которые в них не помещаются,
/// записываются по модулю 2^32.
pub fn encode_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let data_len = pcm.len() as u64 as u32;
    let mut buf = BytesMut::with_capacity(WAV_HEADER_LEN + pcm.len());

    buf.put_slice(b"RIFF");
    buf.put_u32_le(data_len.wrapping_add(36));
    buf.put_slice(b"WAVE");

    buf.put_slice(b"fmt ");
    buf.put_u32_le(16);
    buf.put_u16_le(1); // linear PCM
    buf.put_u16_le(CHANNELS);
    buf.put_u32_le(sample_rate);
    buf.put_u32_le(sample_rate.wrapping_mul(u32::from(BLOCK_ALIGN)));
    buf.put_u16_le(BLOCK_ALIGN);
    buf.put_u16_le(BITS_PER_SAMPLE);

    buf.put_slice(b"data");
    buf.put_u32_le(data_len);
    buf.put_slice(pcm);

    buf.to_vec()
}

/// Умножить каждый 16-битный семпл на `factor` с ограничением диапазона
///
/// При `factor == 1.0` данные возвращаются без изменений. Непарный
/// последний байт копируется как есть.
pub fn apply_gain(pcm: &[u8], factor: f32) -> Vec<u8> {
    if factor == 1.0 {
        return pcm.to_vec();
    }

    let mut out = Vec::with_capacity(pcm.len());
    let mut chunks = pcm.chunks_exact(2);
    for pair in &mut chunks {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        let scaled = (f32::from(sample) * factor).round();
        let clamped = if scaled.is_nan() {
            0
        } else {
            scaled.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
        };
        out.extend_from_slice(&clamped.to_le_bytes());
    }
    out.extend_from_slice(chunks.remainder());
    out
}

/// Длительность PCM данных в секундах
pub fn pcm_duration_secs(pcm_len: usize, sample_rate: u32) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }
    (pcm_len / usize::from(BLOCK_ALIGN)) as f32 / sample_rate as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn read_u16(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn test_header_layout() {
        let pcm = vec![0u8; 480];
        let wav = encode_wav(&pcm, SPEECH_SAMPLE_RATE);

        assert_eq!(wav.len(), 44 + 480);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(read_u32(&wav, 4), 36 + 480);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(read_u32(&wav, 16), 16);
        assert_eq!(read_u16(&wav, 20), 1);
        assert_eq!(read_u16(&wav, 22), 1);
        assert_eq!(read_u32(&wav, 24), 24_000);
        assert_eq!(read_u32(&wav, 28), 48_000);
        assert_eq!(read_u16(&wav, 32), 2);
        assert_eq!(read_u16(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(read_u32(&wav, 40), 480);
    }

    #[test]
    fn test_lengths_for_various_sizes() {
        for (len, rate) in [(0usize, 8000u32), (1, 16_000), (7, 24_000), (4096, 44_100)] {
            let pcm: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let wav = encode_wav(&pcm, rate);
            assert_eq!(wav.len(), 44 + len);
            assert_eq!(read_u32(&wav, 4) as usize, 36 + len);
            assert_eq!(read_u32(&wav, 40) as usize, len);
            assert_eq!(read_u32(&wav, 24), rate);
            assert_eq!(&wav[44..], &pcm[..]);
        }
    }

    #[test]
    fn test_large_sample_rate_wraps_byte_rate() {
        let rate = 3_000_000_000u32;
        let wav = encode_wav(&[0, 0], rate);

        assert_eq!(wav.len(), 46);
        assert_eq!(read_u32(&wav, 24), rate);
        assert_eq!(read_u32(&wav, 28), rate.wrapping_mul(2));
        assert_eq!(read_u32(&wav, 28), 1_705_032_704);
        assert_eq!(read_u32(&wav, 40), 2);
    }

    #[test]
    fn test_encoded_wav_is_readable() {
        let samples: Vec<i16> = vec![0, 1000, -1000, i16::MAX, i16::MIN];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let wav = encode_wav(&pcm, SPEECH_SAMPLE_RATE);

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.bits_per_sample, 16);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_unity_gain_is_identity() {
        let pcm: Vec<u8> = (0..=255u8).chain(0..=10u8).collect();
        assert_eq!(apply_gain(&pcm, 1.0), pcm);
    }

    #[test]
    fn test_gain_clamps_to_i16_range() {
        let samples: Vec<i16> = vec![20_000, -20_000, 100, -1, i16::MAX, i16::MIN];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        for factor in [0.0f32, 0.5, 1.5, 2.0, 10.0, -3.0] {
            let scaled = apply_gain(&pcm, factor);
            assert_eq!(scaled.len(), pcm.len());
            for pair in scaled.chunks_exact(2) {
                let value = i32::from(i16::from_le_bytes([pair[0], pair[1]]));
                assert!((-32768..=32767).contains(&value));
            }
        }

        let doubled = apply_gain(&pcm, 2.0);
        let values: Vec<i16> = doubled
            .chunks_exact(2)
            .map(|p| i16::from_le_bytes([p[0], p[1]]))
            .collect();
        assert_eq!(values, vec![i16::MAX, i16::MIN, 200, -2, i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_gain_is_reproducible_and_keeps_odd_tail() {
        let pcm = vec![0x10, 0x20, 0x30, 0x40, 0x7f];
        let first = apply_gain(&pcm, 0.8);
        let second = apply_gain(&pcm, 0.8);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        assert_eq!(first[4], 0x7f);
    }

    #[test]
    fn test_pcm_duration() {
        assert_eq!(pcm_duration_secs(48_000, SPEECH_SAMPLE_RATE), 1.0);
        assert_eq!(pcm_duration_secs(10, 0), 0.0);
    }
}
