//! PGP word list mnemonics, as used by Decred wallet seeds.
//!
//! Byte `i` of the encoded data is rendered from the even-position list when
//! `i` is even and from the odd-position list otherwise. The last byte of a
//! seed mnemonic is the checksum byte.

mod wordlist;

use crate::checksum::checksum_byte;
use crate::error::DecodeError;

use wordlist::{EVEN_WORDS, ODD_WORDS};

fn words_for(position: usize) -> &'static [&'static str; 256] {
    if position % 2 == 0 {
        &EVEN_WORDS
    } else {
        &ODD_WORDS
    }
}

fn find_word(list: &[&str; 256], word: &str) -> Option<u8> {
    list.iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(word))
        .map(|index| index as u8)
}

/// Decodes whitespace separated words into the bytes they encode.
///
/// Matching is case-insensitive. Empty words are skipped, so runs of
/// whitespace do not shift positions.
pub fn decode_mnemonic<S: AsRef<str>>(words: &[S]) -> Result<Vec<u8>, DecodeError> {
    let mut decoded = Vec::with_capacity(words.len());

    for word in words.iter().map(|w| w.as_ref().trim()).filter(|w| !w.is_empty()) {
        let position = decoded.len();
        match find_word(words_for(position), word) {
            Some(byte) => decoded.push(byte),
            None if find_word(words_for(position + 1), word).is_some() => {
                return Err(DecodeError::MisplacedWord {
                    word: word.to_string(),
                    position,
                });
            }
            None => {
                return Err(DecodeError::UnknownWord {
                    word: word.to_string(),
                });
            }
        }
    }

    Ok(decoded)
}

/// Renders raw bytes as space separated words.
pub fn encode_words(data: &[u8]) -> String {
    data.iter()
        .enumerate()
        .map(|(position, &byte)| words_for(position)[byte as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders a seed as its mnemonic, appending the checksum byte.
pub fn encode_mnemonic(seed: &[u8]) -> String {
    let mut data = Vec::with_capacity(seed.len() + 1);
    data.extend_from_slice(seed);
    data.push(checksum_byte(seed));
    encode_words(&data)
}
