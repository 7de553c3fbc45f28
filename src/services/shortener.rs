use rand::{rngs::OsRng, Rng};

/// Length of generated short codes
pub const SHORT_CODE_LENGTH: usize = 6;

/// Alphabet without look-alike characters (0/O, 1/I/l)
pub const SHORT_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub struct ShortCodeService;

impl ShortCodeService {
    /// Generate a random short code.
    ///
    /// Collisions are not checked here; the caller retries against the store.
    pub fn generate() -> String {
        let mut rng = OsRng;
        (0..SHORT_CODE_LENGTH)
            .map(|_| SHORT_CODE_ALPHABET[rng.gen_range(0..SHORT_CODE_ALPHABET.len())] as char)
            .collect()
    }

    /// Whether `code` could have been produced by `generate`
    pub fn is_well_formed(code: &str) -> bool {
        code.len() == SHORT_CODE_LENGTH && code.bytes().all(|b| SHORT_CODE_ALPHABET.contains(&b))
    }
}
