pub mod bumper_repository;
pub mod object_storage;
pub mod openai_speech_provider;
pub mod polly_speech_provider;
pub mod s3_object_storage;
pub mod speech_provider;

pub use bumper_repository::BumperRepository;
pub use object_storage::{ObjectHandle, ObjectStorage, StorageError};
pub use openai_speech_provider::OpenAiSpeechProvider;
pub use polly_speech_provider::PollySpeechProvider;
pub use s3_object_storage::S3ObjectStorage;
pub use speech_provider::{ProviderAudio, ProviderError, SpeechProvider};
