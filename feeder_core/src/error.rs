use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum FeederError {
    #[error("line error: {0}")]
    Line(String),
    #[error("line fault: {0}")]
    LineFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing optical sensor line")]
    MissingOptoSensor,
    #[error("missing film tension switch line")]
    MissingTensionSwitch,
    #[error("missing advance output line for {0} motion")]
    MissingAdvanceOutput(&'static str),
    #[error("missing peel output line ({0})")]
    MissingPeelOutput(&'static str),
    #[error("missing indicator line")]
    MissingIndicator,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
