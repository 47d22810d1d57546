//! Синтез озвучки
//!
//! Для подкаста используется диалог двух голосов, для остальных форматов
//! один выбранный голос. Ошибки синтеза не прерывают производство: в этом
//! случае возвращается пустой артефакт.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::config::{ContentFormat, ProductionConfig, RetryPolicy, Voice};
use crate::error::{Result, StudioError};
use crate::genai::backend::{GenerativeBackend, SpeakerVoice, SpeechConfig};
use crate::media::audio::{apply_gain, encode_wav, pcm_duration_secs, SPEECH_SAMPLE_RATE};
use crate::media::AudioArtifact;
use crate::retry::retry;

/// Имя ведущего в сценарии подкаста
pub const HOST_SPEAKER: &str = "Host";
/// Имя гостя в сценарии подкаста
pub const GUEST_SPEAKER: &str = "Guest";

/// Выбрать настройку голоса по формату контента
pub fn select_speech_config(config: &ProductionConfig) -> SpeechConfig {
    match config.format {
        ContentFormat::Podcast => SpeechConfig::DualSpeaker {
            speaker_a: SpeakerVoice::new(HOST_SPEAKER, Voice::Puck),
            speaker_b: SpeakerVoice::new(GUEST_SPEAKER, Voice::Kore),
        },
        _ => SpeechConfig::SingleVoice(config.voice()),
    }
}

/// Текст запроса синтеза с указанием тона и темпа
pub fn build_speech_prompt(script: &str, config: &ProductionConfig) -> String {
    match config.format {
        ContentFormat::Podcast => format!(
            "TTS the following conversation between {} and {} in a {} tone at a {} pace:\n{}",
            HOST_SPEAKER,
            GUEST_SPEAKER,
            config.tone.as_str(),
            config.speed.as_str(),
            script
        ),
        _ => format!(
            "Say in a {} tone at a {} pace:\n{}",
            config.tone.as_str(),
            config.speed.as_str(),
            script
        ),
    }
}

/// Синтезировать озвучку; при любой ошибке вернуть пустой артефакт
pub async fn generate_voiceover(
    backend: &dyn GenerativeBackend,
    script: &str,
    config: &ProductionConfig,
    policy: &RetryPolicy,
) -> AudioArtifact {
    if script.trim().is_empty() {
        log::warn!("Script is empty, skipping voice-over");
        return AudioArtifact::empty();
    }

    match try_generate_voiceover(backend, script, config, policy).await {
        Ok(artifact) => artifact,
        Err(e) => {
            log::error!("Voice-over generation failed: {}", e);
            AudioArtifact::empty()
        }
    }
}

async fn try_generate_voiceover(
    backend: &dyn GenerativeBackend,
    script: &str,
    config: &ProductionConfig,
    policy: &RetryPolicy,
) -> Result<AudioArtifact> {
    let speech = select_speech_config(config);
    let text = build_speech_prompt(script, config);
    log::info!("Synthesizing voice-over with {:?}", speech);

    let (speech, text) = (&speech, text.as_str());
    let response = retry(policy, "speech synthesis", move || {
        backend.synthesize_speech(text, speech)
    })
    .await?;

    let (_, data) = response
        .first_inline()
        .ok_or_else(|| StudioError::AudioDecode("response contains no audio data".to_string()))?;
    let pcm = BASE64
        .decode(data.trim())
        .map_err(|e| StudioError::AudioDecode(e.to_string()))?;
    if pcm.is_empty() {
        return Err(StudioError::AudioDecode("audio payload is empty".to_string()));
    }

    let pcm = apply_gain(&pcm, config.volume);
    let wav = encode_wav(&pcm, SPEECH_SAMPLE_RATE);
    log::info!(
        "Voice-over ready: {:.1}s of audio ({} bytes)",
        pcm_duration_secs(pcm.len(), SPEECH_SAMPLE_RATE),
        wav.len()
    );

    AudioArtifact::from_wav(wav)
}
