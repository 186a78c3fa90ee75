use crate::domain::concat::ConcatSettings;
use crate::domain::synthesis::SynthesisSettings;

/// Tunables for one pipeline instance, shared by every invocation it runs
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub synthesis: SynthesisSettings,
    pub concat: ConcatSettings,
    /// Paragraphs shorter than this are skipped when no speaker labels are found
    pub fallback_min_chars: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            synthesis: SynthesisSettings::default(),
            concat: ConcatSettings::default(),
            fallback_min_chars: 20,
        }
    }
}
