use crate::params::GameParams;
use crate::side::Side;
use crate::state::State;

/// Writes an arbitrary-width bit field at a time, little-endian within each
/// byte (LSB-first), flushing completed bytes as it goes. There is no crate
/// in the corpus for sub-byte bit-packing (`byteorder` only moves whole
/// byte-aligned primitives), so this is hand-rolled.
struct BitWriter {
    bytes: Vec<u8>,
    cur: u8,
    filled: u32,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            cur: 0,
            filled: 0,
        }
    }

    fn write(&mut self, mut value: u32, mut width: u32) {
        while width > 0 {
            let take = width.min(8 - self.filled);
            let mask = (1u32 << take) - 1;
            self.cur |= ((value & mask) as u8) << self.filled;
            self.filled += take;
            value >>= take;
            width -= take;
            if self.filled == 8 {
                self.bytes.push(self.cur);
                self.cur = 0;
                self.filled = 0;
            }
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.bytes.push(self.cur);
        }
        self.bytes
    }
}

struct BitReader<'a> {
    bytes: &'a [u8],
    byte_idx: usize,
    bit_idx: u32,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            byte_idx: 0,
            bit_idx: 0,
        }
    }

    fn read(&mut self, mut width: u32) -> u32 {
        let mut value = 0u32;
        let mut shift = 0u32;
        while width > 0 {
            let take = width.min(8 - self.bit_idx);
            let byte = self.bytes[self.byte_idx];
            let mask = ((1u32 << take) - 1) as u8;
            let bits = (byte >> self.bit_idx) & mask;
            value |= (bits as u32) << shift;
            shift += take;
            self.bit_idx += take;
            width -= take;
            if self.bit_idx == 8 {
                self.bit_idx = 0;
                self.byte_idx += 1;
            }
        }
        value
    }
}

/// Packs a state into `2p+2` fixed-width seed-count fields followed by one
/// side-to-move bit, little-endian within each byte, LSB-first.
pub fn pack(params: &GameParams, state: &State) -> Vec<u8> {
    let width = params.bits_per_cell();
    let mut writer = BitWriter::new();
    for &cell in state.cells() {
        writer.write(cell as u32, width);
    }
    writer.write(state.side().bit(), 1);
    writer.finish()
}

/// Inverse of [`pack`]. `unpack(params, &pack(params, s)) == s` for every
/// state reachable under `params`.
pub fn unpack(params: &GameParams, bytes: &[u8]) -> State {
    let width = params.bits_per_cell();
    let mut reader = BitReader::new(bytes);
    let cells = (0..params.board_len())
        .map(|_| reader.read(width) as u16)
        .collect();
    let side = Side::from_bit(reader.read(1));
    State::new(cells, side)
}
