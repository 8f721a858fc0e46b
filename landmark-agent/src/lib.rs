//! Landmark Agent - The Analysis Pipeline
//!
//! The execution unit behind the job layer. One run geocodes the address,
//! gathers nearby amenity, permit, sales, zoning, and climate data from
//! local files, optionally pulls long-form infrastructure context, and asks
//! the LLM reasoner to write the investment memo.
//!
//! Every data tool degrades gracefully when its file is absent; only
//! unreadable data or transport failures raise, and those end up on the job
//! record as failures rather than propagating to pollers.

pub mod pipeline;
pub mod reasoner;
pub mod tools;

pub use pipeline::AnalysisPipeline;
pub use reasoner::{GeminiReasoner, MemoReasoner};
