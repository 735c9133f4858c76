//! Built-in processing steps for the audio indexing pipeline.

pub mod classify;
pub mod denoise;
pub mod enhance;
pub mod rank;
pub mod sentiment;

pub use classify::Classifier;
pub use denoise::NoiseReducer;
pub use enhance::AudioEnhancer;
pub use rank::Ranker;
pub use sentiment::SentimentAnalyzer;
