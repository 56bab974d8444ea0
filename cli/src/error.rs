use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum CliError {
    InvalidArgument(String),
    NoAnswerFiles(Vec<String>),
    UnreadableFile(PathBuf, io::Error),
    Argcheck(argcheck::Error),
    Serialization(serde_yaml::Error),
    Io(io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CliError::InvalidArgument(message) => write!(f, "invalid argument: {}", message),
            CliError::NoAnswerFiles(paths) => {
                write!(f, "no answer files found in {}", paths.join(", "))
            }
            CliError::UnreadableFile(path, e) => {
                write!(f, "couldn't read '{}': {}", path.display(), e)
            }
            CliError::Argcheck(e) => write!(f, "{}", e),
            CliError::Serialization(e) => write!(f, "couldn't serialize evaluation: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<argcheck::Error> for CliError {
    fn from(e: argcheck::Error) -> Self {
        Self::Argcheck(e)
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e)
    }
}
