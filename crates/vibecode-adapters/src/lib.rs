//! # vibecode-adapters
//!
//! Service adapters for the Vibecode interviewer.
//!
//! The only adapter today is [`HttpInterviewService`], which speaks JSON over
//! HTTP to the task generator, code executor, and AI graders behind one base
//! URL.

mod http_service;

pub use http_service::HttpInterviewService;
