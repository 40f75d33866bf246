use super::constants::SBOX;
use super::{BLOCK_SIZE, Block};

/// Encrypts one block under the expanded round keys.
#[inline(always)]
pub(super) fn encrypt_block(input: &Block, round_keys: &[Block]) -> Block {
    let mut state = *input;
    let last = round_keys.len() - 1;

    add_round_key(&mut state, &round_keys[0]);
    for round_key in &round_keys[1..last] {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, round_key);
    }

    // final round has no MixColumns
    sub_bytes(&mut state);
    shift_rows(&mut state);
    add_round_key(&mut state, &round_keys[last]);

    state
}

#[inline(always)]
pub(super) fn add_round_key(state: &mut Block, round_key: &Block) {
    for (s, k) in state.iter_mut().zip(round_key) {
        *s ^= k;
    }
}

/// Multiply by x in GF(2^8), branch-free.
#[inline(always)]
pub(super) fn xtime(a: u8) -> u8 {
    (a << 1) ^ (0x1b & 0u8.wrapping_sub(a >> 7))
}

#[inline(always)]
fn sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = SBOX[*byte as usize];
    }
}

/// Row r rotates left by r. The state is column-major, so byte (row, col) sits at col * 4 + row.
#[inline(always)]
pub(super) fn shift_rows(state: &mut Block) {
    let s = *state;
    for col in 0..4 {
        for row in 1..4 {
            state[col * 4 + row] = s[((col + row) % 4) * 4 + row];
        }
    }
}

/// Each column times the circulant matrix (2 3 1 1).
#[inline(always)]
fn mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(BLOCK_SIZE / 4) {
        let (a, b, c, d) = (column[0], column[1], column[2], column[3]);
        column[0] = xtime(a ^ b) ^ b ^ c ^ d;
        column[1] = xtime(b ^ c) ^ c ^ d ^ a;
        column[2] = xtime(c ^ d) ^ d ^ a ^ b;
        column[3] = xtime(d ^ a) ^ a ^ b ^ c;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_columns_known_columns() {
        // columns from https://en.wikipedia.org/wiki/Rijndael_MixColumns
        let mut state: Block = [
            0xdb, 0x13, 0x53, 0x45, //
            0xf2, 0x0a, 0x22, 0x5c, //
            0x01, 0x01, 0x01, 0x01, //
            0x2d, 0x26, 0x31, 0x4c, //
        ];
        mix_columns(&mut state);
        assert_eq!(
            state,
            [
                0x8e, 0x4d, 0xa1, 0xbc, //
                0x9f, 0xdc, 0x58, 0x9d, //
                0x01, 0x01, 0x01, 0x01, //
                0x4d, 0x7e, 0xbd, 0xf8, //
            ]
        );
    }

    #[test]
    fn shift_rows_moves_rows_left() {
        let mut state: Block = core::array::from_fn(|i| i as u8);
        shift_rows(&mut state);
        // row 1 of column 0 now holds row 1 of column 1, etc.
        assert_eq!(state[1], 5);
        assert_eq!(state[2], 10);
        assert_eq!(state[3], 15);
        assert_eq!(state[0], 0);
        assert_eq!(state[13], 1);
    }
}
