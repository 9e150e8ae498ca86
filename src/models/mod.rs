//! Data models for waxid

pub mod identification;
pub mod release;

pub use identification::{Details, Display, Identification, IdentifiedRecord, Links, StreamingLink};
pub use release::{
    Candidate, ReleaseMatch, CANDIDATE_LIMIT, UNKNOWN_ARTIST, UNKNOWN_LABEL, UNKNOWN_YEAR,
    VARIOUS_ARTISTS,
};
