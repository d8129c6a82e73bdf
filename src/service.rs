pub mod assistant;
pub mod calendar;
pub mod completion;
pub mod parsing;
pub mod prompts;
