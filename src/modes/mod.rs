//! Confidentiality-only modes of operation over any [`BlockCipher`](crate::BlockCipher).
//!
//! These are the raw transforms: IVs are passed in and never prepended. See
//! [`Cipher`](crate::Cipher) for the containerised form.

mod cbc;
mod cfb;
mod ctr;
mod ecb;
mod ofb;
pub(crate) mod util;

pub use cbc::{cbc_decrypt, cbc_encrypt};
pub use cfb::{cfb_decrypt, cfb_encrypt, cfb8_decrypt, cfb8_encrypt};
pub use ctr::ctr_apply;
pub use ecb::{ecb_decrypt, ecb_encrypt};
pub use ofb::ofb_apply;
pub use util::{PARALLEL_THRESHOLD, pad, unpad};

pub(crate) use ctr::keystream_xor;
