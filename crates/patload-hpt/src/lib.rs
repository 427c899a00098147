//! Patload HPT - stream decoding and uploader invocation
//!
//! This crate connects patload-core to the outside world: it opens possibly
//! compressed configuration files as text and drives the external `hpt`
//! uploader process that performs the actual transfer to the tester.

pub mod stream;
pub mod transport;

pub use stream::{codec_for, Codec, SuffixOpener};
pub use transport::HptTransport;
