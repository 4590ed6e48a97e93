// Resume generation: validation, prompt composition, the model call, batch fan-out
// and response assembly. All model traffic goes through llm_client.

pub mod assembler;
pub mod batch;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod sections;
pub mod validation;
