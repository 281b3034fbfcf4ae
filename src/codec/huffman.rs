//! Canonical Huffman coding over raw bytes.
//!
//! The encoder counts byte frequencies, builds a Huffman tree by repeatedly merging the two
//! lightest nodes, and keeps only the depth of each leaf. Codes are then assigned canonically from
//! those depths, so the header only needs the code length of each symbol in use:
//!
//! | field          | size            |
//! |----------------|-----------------|
//! | original size  | u64             |
//! | symbol count k | u16             |
//! | k x (sym, len) | u8, u8          |
//! | body           | bits, 0 padded  |
//!
//! The decoder rebuilds the same canonical codes into a decode tree and walks it one bit at a
//! time, stopping after exactly `original size` symbols so the padding in the last byte is never
//! mistaken for data.
//!
//! A buffer with a single distinct byte gets the one bit code `0`. The decoder knows the symbol
//! and the count from the header, so it only checks that the body has the expected size.

use log::{debug, error, trace};
use std::cmp::Ordering;

use super::error::{DecodeError, Result};
use super::Codec;
use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::tools::freq_count::freqs;

/// Longest code we will hand out. Codes are written with BitWriter::out, which takes up to 32 bits.
pub const MAX_CODE_LEN: u8 = 32;

/// Canonical Huffman codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct Huffman;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum NodeData {
    Kids(Box<Node>, Box<Node>),
    Leaf(u8),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Node {
    pub weight: u64,
    pub depth: u8,
    /// Tie breaker: the byte value for leaves, 256 + merge count for parents.
    pub order: u32,
    pub node_data: NodeData,
}

impl Node {
    /// Create a new node
    pub fn new(weight: u64, depth: u8, order: u32, node_data: NodeData) -> Node {
        Node {
            weight,
            depth,
            order,
            node_data,
        }
    }
}

impl Ord for Node {
    /// Sort Nodes by decreasing weight and decreasing order, so the lightest node pops first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns (symbol, code length) for every byte that occurs in `freqs`, in ascending symbol order.
/// A lone symbol gets length 1.
pub fn code_lengths(freqs: &[u64; 256]) -> Vec<(u8, u8)> {
    let mut weight: Vec<(u64, u8)> = freqs
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f > 0)
        .map(|(sym, &f)| (f, sym as u8))
        .collect();

    match weight.len() {
        0 => return vec![],
        1 => return vec![(weight[0].1, 1)],
        _ => {}
    }

    // We need codes of MAX_CODE_LEN bits or less. If we can't, flatten the weights and try again.
    loop {
        // Turn the weights into leaves
        let mut tree: Vec<Node> = weight
            .iter()
            .map(|&(f, sym)| Node::new(f, 0, sym as u32, NodeData::Leaf(sym)))
            .collect();

        // ...then pare it down to one single node with child nodes - keep it sorted.
        let mut merges = 0;
        let root = loop {
            tree.sort_unstable();
            // Pull off the two lightest nodes and make a new parent
            match (tree.pop(), tree.pop()) {
                (Some(right_child), Some(left_child)) => {
                    tree.push(Node::new(
                        left_child.weight + right_child.weight,
                        left_child.depth.max(right_child.depth).saturating_add(1),
                        256 + merges,
                        NodeData::Kids(Box::new(left_child), Box::new(right_child)),
                    ));
                    merges += 1;
                }
                (Some(root), None) => break root,
                (None, _) => return vec![],
            }
        };

        if root.depth <= MAX_CODE_LEN {
            let mut leaves = Vec::with_capacity(weight.len());
            return_leaves(&root, 0, &mut leaves);
            leaves.sort_unstable();
            return leaves;
        }
        debug!(
            "Huffman tree depth {} is over {}, flattening weights.",
            root.depth, MAX_CODE_LEN
        );
        // Dividing each weight by 2 and adding 1 "flattens" the tree.
        for item in weight.iter_mut() {
            item.0 = 1 + item.0 / 2;
        }
    }
}

/// Recursively walk the tree and return in "leaves" how far (deep) from the root node each leaf is.
/// Depth is the same as the code length.
fn return_leaves(node: &Node, depth: u8, leaves: &mut Vec<(u8, u8)>) {
    match &node.node_data {
        NodeData::Kids(left_child, right_child) => {
            return_leaves(left_child, depth + 1, leaves);
            return_leaves(right_child, depth + 1, leaves);
        }
        NodeData::Leaf(sym) => leaves.push((*sym, depth)),
    }
}

/// Assign canonical codes from code lengths. Returns (symbol, code, length) sorted by length
/// and then symbol. Codes are sequential within each length; when the length grows the next code
/// is shifted left by the difference.
pub fn canonical_codes(lengths: &[(u8, u8)]) -> Vec<(u8, u32, u8)> {
    let mut len_sym: Vec<(u8, u8)> = lengths.iter().map(|&(sym, len)| (len, sym)).collect();
    len_sym.sort_unstable();

    let mut codes = Vec::with_capacity(len_sym.len());
    let Some(&(first_len, _)) = len_sym.first() else {
        return codes;
    };
    let mut next_code: (u8, u64) = (first_len, 0);
    for (len, sym) in len_sym {
        if len != next_code.0 {
            next_code.1 <<= len - next_code.0;
            next_code.0 = len;
        }
        codes.push((sym, next_code.1 as u32, len));
        next_code.1 += 1;
    }
    codes
}

/// Check that the persisted lengths describe something we could have written.
fn check_lengths(lengths: &[(u8, u8)]) -> Result<()> {
    if lengths.windows(2).any(|w| w[0].0 >= w[1].0) {
        return Err(DecodeError::BadTable("symbols are not in ascending order"));
    }
    if lengths
        .iter()
        .any(|&(_, len)| len == 0 || len > MAX_CODE_LEN)
    {
        return Err(DecodeError::BadTable("code length out of range"));
    }
    match lengths.len() {
        0 => Ok(()),
        1 if lengths[0].1 == 1 => Ok(()),
        1 => Err(DecodeError::BadTable("a lone symbol must have a 1 bit code")),
        _ => {
            // A Huffman tree is full, so the Kraft sum is exactly one.
            let kraft: u64 = lengths
                .iter()
                .map(|&(_, len)| 1_u64 << (MAX_CODE_LEN - len))
                .sum();
            if kraft == 1_u64 << MAX_CODE_LEN {
                Ok(())
            } else {
                Err(DecodeError::BadTable("code lengths do not form a full prefix code"))
            }
        }
    }
}

/// Decode tree node. Branch children index into the tree vec.
#[derive(Debug, Clone, Copy)]
enum DecodeNode {
    Branch([Option<usize>; 2]),
    Leaf(u8),
}

/// Rebuild a decode tree from canonical codes. The root is at index 0.
fn decode_tree(codes: &[(u8, u32, u8)]) -> Result<Vec<DecodeNode>> {
    let mut tree = vec![DecodeNode::Branch([None, None])];
    for &(sym, code, len) in codes {
        let mut node = 0;
        for shift in (0..len).rev() {
            let bit = (code >> shift) as usize & 1;
            let DecodeNode::Branch(kids) = tree[node] else {
                return Err(DecodeError::BadTable("code passes through a leaf"));
            };
            node = match kids[bit] {
                Some(child) => child,
                None => {
                    let child = tree.len();
                    tree.push(if shift == 0 {
                        DecodeNode::Leaf(sym)
                    } else {
                        DecodeNode::Branch([None, None])
                    });
                    let mut kids = kids;
                    kids[bit] = Some(child);
                    tree[node] = DecodeNode::Branch(kids);
                    child
                }
            };
        }
        if !matches!(tree[node], DecodeNode::Leaf(s) if s == sym) {
            return Err(DecodeError::BadTable("code is a prefix of another code"));
        }
    }
    Ok(tree)
}

fn read_header(br: &mut BitReader<'_>) -> Result<(u64, Vec<(u8, u8)>)> {
    let size = br.u64().ok_or(DecodeError::TruncatedHeader {
        field: "original size",
    })?;
    let symbols = br.u16().ok_or(DecodeError::TruncatedHeader {
        field: "symbol count",
    })? as usize;
    if symbols > 256 {
        return Err(DecodeError::BadTable("more than 256 symbols"));
    }
    let mut lengths = Vec::with_capacity(symbols);
    for _ in 0..symbols {
        let (Some(sym), Some(len)) = (br.byte(), br.byte()) else {
            return Err(DecodeError::TruncatedHeader {
                field: "code length table",
            });
        };
        lengths.push((sym, len));
    }
    match (size, symbols) {
        (0, 0) => {}
        (_, 0) => return Err(DecodeError::BadTable("data without symbols")),
        (0, _) => return Err(DecodeError::BadTable("symbols without data")),
        _ => {}
    }
    check_lengths(&lengths)?;
    Ok((size, lengths))
}

impl Codec for Huffman {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        let freqs = freqs(data);
        let lengths = code_lengths(&freqs);
        let codes = canonical_codes(&lengths);
        trace!("Huffman codes (sym, code, len): {:?}", codes);

        // Index the codes by symbol for the encoding pass
        let mut table = [(0_u32, 0_u8); 256];
        for &(sym, code, len) in &codes {
            table[sym as usize] = (code, len);
        }
        let body_bits: u64 = lengths
            .iter()
            .map(|&(sym, len)| freqs[sym as usize] * len as u64)
            .sum();

        let mut bw = BitWriter::new(10 + lengths.len() * 2 + (body_bits / 8) as usize + 1);
        bw.out64(data.len() as u64);
        bw.out16(lengths.len() as u16);
        for &(sym, len) in &lengths {
            bw.out8(sym);
            bw.out8(len);
        }
        trace!("Huffman body starts at {}.", bw.loc());
        for &byte in data {
            let (code, len) = table[byte as usize];
            bw.out(len, code);
        }
        bw.flush();
        debug!(
            "Huffman wrote {} symbols, {} body bits, {} padding bits.",
            lengths.len(),
            body_bits,
            bw.padding
        );
        bw.output
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut br = BitReader::new(data);
        let (size, lengths) = read_header(&mut br).map_err(|e| {
            error!("Bad Huffman header: {}", e);
            e
        })?;
        debug!(
            "Huffman header: {} bytes from {} symbols, body at {}.",
            size,
            lengths.len(),
            br.loc()
        );

        // Every symbol costs at least one bit, which bounds what a corrupt size can reserve.
        let mut out = Vec::with_capacity(size.min(br.bits_left() as u64) as usize);

        match lengths.as_slice() {
            [] => {}
            [(sym, _)] => {
                // One symbol, one bit each. The body is just padding-aligned zero bits.
                let bits = br.bits_left() as u64;
                if bits < size {
                    return Err(DecodeError::TruncatedBody {
                        produced: bits,
                        expected: size,
                    });
                }
                if bits - size >= 8 {
                    return Err(DecodeError::TrailingData(((bits - size) / 8) as usize));
                }
                out.resize(size as usize, *sym);
                return Ok(out);
            }
            _ => {
                let tree = decode_tree(&canonical_codes(&lengths))?;
                while (out.len() as u64) < size {
                    let mut node = 0;
                    loop {
                        match tree[node] {
                            DecodeNode::Leaf(sym) => {
                                out.push(sym);
                                break;
                            }
                            DecodeNode::Branch(kids) => {
                                let Some(bit) = br.bit() else {
                                    return Err(DecodeError::TruncatedBody {
                                        produced: out.len() as u64,
                                        expected: size,
                                    });
                                };
                                node = kids[bit].ok_or(DecodeError::BadTable(
                                    "bit sequence does not reach a symbol",
                                ))?;
                            }
                        }
                    }
                }
            }
        }

        match br.untouched_bytes() {
            0 => Ok(out),
            extra => Err(DecodeError::TrailingData(extra)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lengths_of(data: &[u8]) -> Vec<(u8, u8)> {
        code_lengths(&freqs(data))
    }

    #[test]
    fn empty_round_trip() {
        let packed = Huffman.compress(&[]);
        assert_eq!(packed.len(), 10);
        assert!(Huffman.decompress(&packed).unwrap().is_empty());
    }

    #[test]
    fn single_symbol_round_trip() {
        let data = vec![0_u8; 50];
        let packed = Huffman.compress(&data);
        // header (8 + 2 + 2) plus 50 one bit codes
        assert_eq!(packed.len(), 12 + 7);
        assert_eq!(Huffman.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn single_byte_input() {
        let packed = Huffman.compress(&[0xff]);
        assert_eq!(Huffman.decompress(&packed).unwrap(), [0xff]);
    }

    #[test]
    fn skewed_input_gives_frequent_byte_the_short_code() {
        let lengths = lengths_of(b"aaaaaaaab");
        let len = |s: u8| lengths.iter().find(|l| l.0 == s).unwrap().1;
        assert!(len(b'a') <= len(b'b'));

        let lengths = lengths_of(b"aaaaaaaaaaaabbbbccd");
        let len = |s: u8| lengths.iter().find(|l| l.0 == s).unwrap().1;
        assert!(len(b'a') <= len(b'b'));
        assert!(len(b'b') <= len(b'c'));
        assert!(len(b'c') <= len(b'd'));
    }

    #[test]
    fn ties_resolve_the_same_way_every_time() {
        // a-d all occur twice and e once, so several merge orders would be valid.
        let lengths = lengths_of(b"aabbccdde");
        assert_eq!(
            lengths,
            vec![(b'a', 3), (b'b', 2), (b'c', 2), (b'd', 2), (b'e', 3)]
        );
        let codes = canonical_codes(&lengths);
        assert_eq!(
            codes,
            vec![
                (b'b', 0b00, 2),
                (b'c', 0b01, 2),
                (b'd', 0b10, 2),
                (b'a', 0b110, 3),
                (b'e', 0b111, 3)
            ]
        );
        let data = b"abcdefgh".repeat(20);
        assert_eq!(Huffman.compress(&data), Huffman.compress(&data));
    }

    #[test]
    fn all_byte_values_round_trip() {
        let data: Vec<u8> = (0..4096_u32).map(|i| (i * 31 % 256) as u8).collect();
        let packed = Huffman.compress(&data);
        assert_eq!(Huffman.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn text_compresses() {
        let data = b"this is an example for huffman encoding, a fine example indeed".repeat(10);
        let packed = Huffman.compress(&data);
        assert!(packed.len() < data.len());
        assert_eq!(Huffman.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn deep_trees_are_flattened() {
        // Fibonacci weights make the deepest possible tree.
        let mut freqs = [0_u64; 256];
        let (mut a, mut b) = (1_u64, 1_u64);
        for f in freqs.iter_mut().take(50) {
            *f = a;
            (a, b) = (b, a + b);
        }
        let lengths = code_lengths(&freqs);
        assert_eq!(lengths.len(), 50);
        assert!(lengths.iter().all(|&(_, len)| len <= MAX_CODE_LEN));
        assert!(check_lengths(&lengths).is_ok());
    }

    #[test]
    fn truncated_body_is_an_error() {
        let data = b"abracadabra".repeat(5);
        let mut packed = Huffman.compress(&data);
        packed.truncate(packed.len() - 3);
        assert!(matches!(
            Huffman.decompress(&packed),
            Err(DecodeError::TruncatedBody { .. })
        ));
    }

    #[test]
    fn truncated_header_is_an_error() {
        let packed = Huffman.compress(b"abracadabra");
        assert!(matches!(
            Huffman.decompress(&packed[..5]),
            Err(DecodeError::TruncatedHeader { .. })
        ));
        assert!(matches!(
            Huffman.decompress(&packed[..13]),
            Err(DecodeError::TruncatedHeader { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_an_error() {
        let mut packed = Huffman.compress(b"abracadabra");
        packed.push(0);
        assert_eq!(
            Huffman.decompress(&packed),
            Err(DecodeError::TrailingData(1))
        );
        let mut packed = Huffman.compress(&[9; 16]);
        packed.push(0);
        assert_eq!(
            Huffman.decompress(&packed),
            Err(DecodeError::TrailingData(1))
        );
    }

    #[test]
    fn corrupt_lengths_are_an_error() {
        let mut packed = Huffman.compress(b"abracadabra");
        // First code length lives at byte 11.
        packed[11] += 1;
        assert!(matches!(
            Huffman.decompress(&packed),
            Err(DecodeError::BadTable(_))
        ));
    }

    #[test]
    fn size_without_symbols_is_an_error() {
        let mut bw = BitWriter::new(10);
        bw.out64(5);
        bw.out16(0);
        assert_eq!(
            Huffman.decompress(&bw.finish()),
            Err(DecodeError::BadTable("data without symbols"))
        );
    }
}
