#[macro_use]
extern crate tracing;

use std::fmt::{self, Display};

use agora_types::{
    ObjectId, ParseError, PublicKey, ResponseCode,
    entity::{Comment, Post, User, Validator, Vote, classify_title},
    query::{self, PostFilter, SortBy},
    response::{CommentView, PostThread, PostView, UpvoteStatus},
    transaction::{
        AuthenticatedTx, Command, CreateComment, CreatePost, CreateUser, Transaction,
        UpvoteComment, UpvotePost, UpvoteValidator,
    },
};
use color_eyre::{
    Report,
    eyre::{OptionExt, bail, eyre},
};
use futures::{StreamExt, TryStreamExt};
use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use tendermint::{
    AppHash, Time,
    abci::{request, response},
    block::{Header, Height},
    validator::Update,
    vote::Power,
};

/// Return early with a [`TxError::Rejected`] carrying the given code and formatted reason.
macro_rules! reject {
    ($code:expr, $($arg:tt)*) => {
        return Err($crate::TxError::Rejected {
            code: $code,
            reason: format!($($arg)*),
        })
    };
}
use reject;

mod store;
pub use store::{DEFAULT_QUERY_CONCURRENCY, Store};
use store::{
    StateReadExt, StateWriteExt,
    Substore::{Documents, Internal},
};

/// ABCI service implementation for [`Store`].
mod abci;

/// The hot-ranking formula.
pub mod ranking;

mod state;
pub use state::{Collection, Parameters, Toggle, VoteLedger, encode_checkpoint};

#[derive(Debug, Clone)]
pub struct State<S> {
    store: S,
}

impl<S> State<S> {
    /// Create a new state with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Unwrap the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Why a transaction was not applied.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    /// The transaction is invalid against the current state; reported back with a nonzero code.
    #[error("{reason}")]
    Rejected { code: ResponseCode, reason: String },
    /// The state itself could not be read or written; this is fatal to the node.
    #[error("{0}")]
    Fault(Report),
}

impl TxError {
    /// The response code to report for this error.
    pub fn code(&self) -> ResponseCode {
        match self {
            TxError::Rejected { code, .. } => *code,
            // Faults never reach a response, but nonzero is the only honest answer:
            TxError::Fault(_) => ResponseCode::BadData,
        }
    }
}

impl From<ParseError> for TxError {
    fn from(error: ParseError) -> Self {
        TxError::Rejected {
            code: error.code(),
            reason: error.to_string(),
        }
    }
}

impl From<Report> for TxError {
    fn from(report: Report) -> Self {
        TxError::Fault(report)
    }
}
