pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("layout requires a directed graph")]
    Undirected,

    #[error("edge ({v:?}, {w:?}) has minlen {minlen}, expected at least 1")]
    BadMinlen { v: String, w: String, minlen: i32 },

    #[error("warrant targets nonexistent edge ({v:?}, {w:?})")]
    MissingWarrantEdge { v: String, w: String },

    #[error("conjunct references nonexistent edge ({v:?}, {w:?})")]
    MissingConjunctEdge { v: String, w: String },

    /// A broken internal invariant. Not reachable from valid input.
    #[error("internal invariant violated: {context}")]
    Unreachable { context: String },
}

impl Error {
    pub(crate) fn unreachable(context: impl Into<String>) -> Self {
        Error::Unreachable {
            context: context.into(),
        }
    }
}
