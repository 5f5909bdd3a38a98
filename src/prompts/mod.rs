//! Prompt templates for the LLM-backed stages.

pub mod keywords;
pub mod relevance;
pub mod synthesis;
