#[cfg(feature = "seaorm")]
pub mod seaorm;
