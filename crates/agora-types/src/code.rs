use std::fmt::{self, Display};

use tendermint::abci::Code;

/// Result codes returned from CheckTx and DeliverTx.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResponseCode {
    Ok = 0,
    EncodingError = 1,
    BadSignature = 2,
    BadData = 3,
}

impl ResponseCode {
    pub fn value(self) -> u32 {
        self as u32
    }
}

impl Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Ok => write!(f, "ok"),
            ResponseCode::EncodingError => write!(f, "encoding error"),
            ResponseCode::BadSignature => write!(f, "bad signature"),
            ResponseCode::BadData => write!(f, "bad data"),
        }
    }
}

impl From<ResponseCode> for Code {
    fn from(code: ResponseCode) -> Self {
        Code::from(code.value())
    }
}
