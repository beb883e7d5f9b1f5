//! Error types and result definitions for the factload workspace.
//!
//! Every crate in the workspace returns [`Result<T>`] and fails with the single
//! [`Error`] enum defined here, so errors raised deep inside a fact writer or key
//! packer propagate with `?` all the way to the stage driver.
//!
//! # Error Categories
//!
//! - **I/O errors** ([`Error::Io`]): directory creation, fragment files
//! - **Data format errors** ([`Error::Arrow`], [`Error::Parquet`]): columnar encoding
//! - **Configuration errors** ([`Error::Configuration`], [`Error::Json`]): invalid load setup
//! - **Key packing errors** ([`Error::KeyGeneration`]): indices that do not fit the key layout
//! - **Writer errors** ([`Error::FactWriter`]): fragment creation, write and close failures
//! - **Load failures** ([`Error::DataLoading`]): the uniform fatal error surfaced by the stage

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
