//! Chess rules engine: legal move generation and game status classification.
//!
//! This crate does not play chess: there is no search, no evaluation, no
//! opening book. It answers two questions about a position — what are the
//! legal moves, and what is the game's status (check, checkmate, stalemate,
//! draw) — and nothing else.
//!
//! - [`chess::game::Game`] is the entry point: construct one from a FEN
//!   string, apply moves, and query legal moves or status.
//! - [`chess::geometry`] precomputes the ray tables every other module reads.
//! - [`chess::attacks`] resolves whether a square is attacked and which
//!   pieces are pinned.
//! - [`chess::movegen`] composes the above into the legal move generator and
//!   status classifier.

// TODO: Gradually move most of warnings to deny.
#![warn(missing_docs, variant_size_differences)]
// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications
)]
// Rustdoc lints.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery
)]
// Performance is extremely important.
#![deny(clippy::perf)]

pub mod chess;
pub mod error;

pub use error::IllegalMoveError;
