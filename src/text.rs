/// Narration length estimate.
pub mod estimate;
/// `##highlight##` caption markup.
pub mod markup;
