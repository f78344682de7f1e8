use hmac::{Hmac, Mac};
use rand::{Rng, RngCore};
use sha2::Sha256;

use crate::draw::DrawTable;

// Randomness is injected: the engine only ever sees a RandomSource.
// ProvablyFairRng: server_seed (secret) + client_seed + nonce -> HMAC-SHA256 -> u32 -> [0,1)

pub type HmacSha256 = Hmac<Sha256>;

/// A source of uniform floats in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

pub fn derive_hash_hex(input: &[u8]) -> String {
    use sha2::Digest;
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// First four bytes, big-endian, scaled into `[0, 1)`.
pub fn unit_from_bytes(bytes: &[u8; 32]) -> f64 {
    let v = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    (v as f64) / (u32::MAX as f64 + 1.0)
}

#[derive(Debug, Clone)]
pub struct ProvablyFairRng {
    pub server_seed: String, // secret until rotated
    pub client_seed: String,
    pub nonce: u64,
}

impl ProvablyFairRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn hmac_bytes(&self) -> [u8; 32] {
        // HMAC takes keys of any length
        let mut mac = HmacSha256::new_from_slice(self.server_seed.as_bytes()).expect("HMAC key");
        let msg = format!("{}:{}", self.client_seed, self.nonce);
        mac.update(msg.as_bytes());
        let res = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&res);
        out
    }

    /// The value for the current nonce, without advancing.
    pub fn peek_unit(&self) -> f64 {
        unit_from_bytes(&self.hmac_bytes())
    }
}

impl RandomSource for ProvablyFairRng {
    fn next_unit(&mut self) -> f64 {
        let u = self.peek_unit();
        self.nonce += 1;
        u
    }
}

/// Recompute a past draw from revealed seeds and check it landed on `expected_index`.
pub fn verify_draw(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    table: &DrawTable,
    expected_index: usize,
) -> bool {
    let rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    table.pick(rng.peek_unit()) == expected_index
}

/// Adapter for any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandSource<R>(pub R);

impl<R: RngCore> RandomSource for RandSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Cycles through a fixed list of values. Used to force outcomes.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceSource {
    /// An empty list behaves like a constant 0.0.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos = (self.pos + 1) % self.values.len();
        v
    }
}
