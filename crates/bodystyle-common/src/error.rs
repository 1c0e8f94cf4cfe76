/// Errors shared by the bodystyle crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("range start={start} length={length} exceeds body of {body_len} units")]
    RangeOutOfBounds {
        start: usize,
        length: usize,
        body_len: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_error_names_the_offending_span() {
        let err = Error::RangeOutOfBounds {
            start: 4,
            length: 10,
            body_len: 8,
        };
        assert_eq!(
            err.to_string(),
            "range start=4 length=10 exceeds body of 8 units"
        );
    }

    #[test]
    fn io_errors_convert() {
        fn read() -> Result<String> {
            Ok(std::fs::read_to_string("/definitely/not/here/bodystyle")?)
        }
        assert!(matches!(read(), Err(Error::Io(_))));
    }
}
