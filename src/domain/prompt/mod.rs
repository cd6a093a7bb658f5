//! Prompt module - scenario normalization and customer prompt synthesis.

mod scenario;
mod synthesizer;

pub use scenario::{LegacyScenario, ModernScenario, ScenarioConfig, ScenarioRequest};
pub use synthesizer::{
    PersonaResolution, PromptSynthesizer, SynthesizedPrompt, DEFAULT_CONFIDENCE_THRESHOLD,
};
