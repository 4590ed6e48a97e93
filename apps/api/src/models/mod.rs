pub mod resume;

pub use resume::{BatchItemResult, ErrorKind, GenerationOutcome, ResumeRequest};
