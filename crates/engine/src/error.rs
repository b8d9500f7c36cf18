//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Slip`] returned when a bet slip fails to parse.
//! - [`KeyNotFound`] returned when a voucher or ledger entry does not exist.
//! - [`AlreadyReversed`] returned when a ledger entry is reversed twice.
//! - [`InvalidData`] returned when a stored row or a computed date cannot be
//!   represented.
//!
//!  [`Slip`]: EngineError::Slip
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`AlreadyReversed`]: EngineError::AlreadyReversed
//!  [`InvalidData`]: EngineError::InvalidData
use sea_orm::DbErr;
use thiserror::Error;

use crate::parser::SlipError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Slip(#[from] SlipError),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("ledger entry \"{0}\" already reversed")]
    AlreadyReversed(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Slip(a), Self::Slip(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::AlreadyReversed(a), Self::AlreadyReversed(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidSettings(a), Self::InvalidSettings(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidData(a), Self::InvalidData(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
