use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn alloc_failed(size: usize, align: usize) -> Error {
        Error(ErrorKind::AllocFailed { size, align }.into())
    }

    pub fn element<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::ElementFailed {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    /// Returns `true` if the error originates from the memory provider
    /// (either the request could not be expressed or the allocator refused it).
    pub fn is_alloc_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AllocFailed { .. } | ErrorKind::CapacityOverflow { .. }
        )
    }

    /// Returns `true` if the error was raised by an element factory.
    pub fn is_element_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::ElementFailed { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("capacity overflow: {requested} elements of {element_size} bytes")]
    CapacityOverflow {
        requested: usize,
        element_size: usize,
    },

    #[error("memory allocation of {size} bytes (alignment {align}) failed")]
    AllocFailed { size: usize, align: usize },

    #[error("element operation failed: {context}")]
    ElementFailed {
        context: String,
        #[source]
        source: StdErrorBoxed,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
