//! Arithmetic in GF(2^128) modulo x^128 + x^7 + x^2 + x + 1.
//!
//! Two conventions are in use. GHASH (GCM) reflects bits: the leftmost bit of the block is
//! the coefficient of x^0, so multiplying by x is a right shift. CMAC subkey doubling uses the
//! ordinary big-endian convention, where multiplying by x is a left shift.

use crate::block::Block;

// x^128 = x^7 + x^2 + x + 1, bit-reflected into the top byte
const GHASH_R: u128 = 0xE100_0000_0000_0000_0000_0000_0000_0000;

// same polynomial for the left-shift convention
const DBL_R: u128 = 0x87;

/// GHASH multiplication `x ⊗ y`, bit by bit (double-and-add), with no branches on the operands.
#[inline(always)]
pub fn gf_mul(x: &Block, y: &Block) -> Block {
    let x = u128::from_be_bytes(*x);
    let mut v = u128::from_be_bytes(*y);
    let mut z: u128 = 0;

    // walk x from its first (most significant) bit
    for i in (0..128).rev() {
        let bit = (x >> i) & 1;
        z ^= v & 0u128.wrapping_sub(bit);
        v = mul_x(v);
    }

    z.to_be_bytes()
}

#[inline(always)]
fn mul_x(v: u128) -> u128 {
    let lsb = v & 1;
    (v >> 1) ^ (GHASH_R & 0u128.wrapping_sub(lsb))
}

/// Doubling for CMAC subkeys: shift left one bit, folding the carried-out bit back in as 0x87.
#[inline(always)]
pub fn dbl(block: &Block) -> Block {
    let v = u128::from_be_bytes(*block);
    let carry = v >> 127;
    ((v << 1) ^ (DBL_R & 0u128.wrapping_sub(carry))).to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // x^0 in the reflected representation
    const ONE: Block = hex!("80000000000000000000000000000000");

    #[test]
    fn one_is_identity() {
        let h = hex!("66e94bd4ef8a2c3b884cfa59ca342b2e");
        assert_eq!(gf_mul(&ONE, &h), h);
        assert_eq!(gf_mul(&h, &ONE), h);
    }

    #[test]
    fn multiplication_commutes() {
        let a = hex!("0388dace60b6a392f328c2b971b2fe78");
        let b = hex!("66e94bd4ef8a2c3b884cfa59ca342b2e");
        assert_eq!(gf_mul(&a, &b), gf_mul(&b, &a));
    }

    #[test]
    fn gcm_test_case_2_ghash_step() {
        // SP 800-38D test case 2: X1 = C1 ⊗ H
        let h = hex!("66e94bd4ef8a2c3b884cfa59ca342b2e");
        let c = hex!("0388dace60b6a392f328c2b971b2fe78");
        assert_eq!(gf_mul(&c, &h), hex!("5e2ec746917062882c85b0685353deb7"));
    }

    #[test]
    fn cmac_subkeys_rfc4493() {
        // L = AES-128(2b7e1516..., 0^128)
        let l = hex!("7df76b0c1ab899b33e42f047b91b546f");
        let k1 = dbl(&l);
        assert_eq!(k1, hex!("fbeed618357133667c85e08f7236a8de"));
        assert_eq!(dbl(&k1), hex!("f7ddac306ae266ccf90bc11ee46d513b"));
    }
}
