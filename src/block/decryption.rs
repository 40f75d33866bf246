use super::constants::SBOX_INV;
use super::encryption::{add_round_key, xtime};
use super::{BLOCK_SIZE, Block};

/// Decrypts one block under the expanded round keys (inverse cipher, FIPS-197 5.3).
#[inline(always)]
pub(super) fn decrypt_block(input: &Block, round_keys: &[Block]) -> Block {
    let mut state = *input;
    let last = round_keys.len() - 1;

    add_round_key(&mut state, &round_keys[last]);
    for round_key in round_keys[1..last].iter().rev() {
        inv_shift_rows(&mut state);
        inv_sub_bytes(&mut state);
        add_round_key(&mut state, round_key);
        inv_mix_columns(&mut state);
    }

    inv_shift_rows(&mut state);
    inv_sub_bytes(&mut state);
    add_round_key(&mut state, &round_keys[0]);

    state
}

#[inline(always)]
fn inv_sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = SBOX_INV[*byte as usize];
    }
}

/// Row r rotates right by r.
#[inline(always)]
fn inv_shift_rows(state: &mut Block) {
    let s = *state;
    for col in 0..4 {
        for row in 1..4 {
            state[((col + row) % 4) * 4 + row] = s[col * 4 + row];
        }
    }
}

/// Each column times (14 11 13 9), computed as a premultiply by (5 0 4 0) followed by
/// the forward (2 3 1 1) matrix.
#[inline(always)]
fn inv_mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(BLOCK_SIZE / 4) {
        let (a, b, c, d) = (column[0], column[1], column[2], column[3]);
        let u = xtime(xtime(a ^ c));
        let v = xtime(xtime(b ^ d));
        let (a, b, c, d) = (a ^ u, b ^ v, c ^ u, d ^ v);
        column[0] = xtime(a ^ b) ^ b ^ c ^ d;
        column[1] = xtime(b ^ c) ^ c ^ d ^ a;
        column[2] = xtime(c ^ d) ^ d ^ a ^ b;
        column[3] = xtime(d ^ a) ^ a ^ b ^ c;
    }
}

#[cfg(test)]
mod tests {
    use super::super::encryption::shift_rows;
    use super::*;

    #[test]
    fn inv_shift_rows_reverses_shift_rows() {
        let original: Block = core::array::from_fn(|i| (i as u8).wrapping_mul(17));
        let mut state = original;
        shift_rows(&mut state);
        inv_shift_rows(&mut state);
        assert_eq!(state, original);
    }

    #[test]
    fn inv_mix_columns_known_column() {
        let mut state: Block = [
            0x8e, 0x4d, 0xa1, 0xbc, //
            0x9f, 0xdc, 0x58, 0x9d, //
            0x01, 0x01, 0x01, 0x01, //
            0x4d, 0x7e, 0xbd, 0xf8, //
        ];
        inv_mix_columns(&mut state);
        assert_eq!(
            state,
            [
                0xdb, 0x13, 0x53, 0x45, //
                0xf2, 0x0a, 0x22, 0x5c, //
                0x01, 0x01, 0x01, 0x01, //
                0x2d, 0x26, 0x31, 0x4c, //
            ]
        );
    }
}
