use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetcalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster error: {0}")]
    Roster(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote command error: {0}")]
    Remote(String),

    #[error("Worker pool error: {0}")]
    Pool(String),
}

pub type Error = FleetcalError;
pub type Result<T> = std::result::Result<T, Error>;
