use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid formula: {0}")]
    InvalidFormula(String),
    #[error("Unknown element: {0}")]
    UnknownElement(String),
    #[error("Unknown monomer in the sequence: {0}")]
    UnknownMonomer(char),
    #[error("Unknown enzyme: {0}")]
    UnknownEnzyme(String),
    #[error("Unknown modification: {0}")]
    UnknownModification(String),
    #[error("Unknown fragment series: {0}")]
    UnknownFragmentSeries(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid slice {0}..{1}")]
    InvalidSlice(usize, usize),
    #[error("{0} is not supported for cyclic sequences")]
    UnsupportedForCyclic(&'static str),
    #[error("m/z ({0}) and intensities ({1}) arrays must have the same length")]
    PeakListShape(usize, usize),
    #[error("Processing cancelled")]
    Cancelled,
    #[error("Another task is already running")]
    WorkerBusy,
    #[error("Worker thread disconnected before publishing a result")]
    WorkerDisconnected,
}

impl Error {
    /// Cancellation is not a failure, callers usually treat it as "nothing produced".
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
