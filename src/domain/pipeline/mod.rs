pub mod model;
pub mod service;
pub mod settings;

pub use model::{Degradations, ResultMetadata, SynthesisResult};
pub use service::{PodcastPipeline, PodcastPipelineApi};
pub use settings::PipelineSettings;
