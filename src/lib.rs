//! QuizCraft · quiz request service
//!
//! Holds the state of the QuizCraft page (question groups, attached study
//! materials, submission state) per mounted form, forwards submissions to the
//! quiz generation backend as multipart uploads, and summarizes earlier quizzes.

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod form;
pub mod history;
pub mod logic;
pub mod payload;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod telemetry;
