use rampart_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid run configuration: {0}")]
    Config(#[from] ConfigError),
}
