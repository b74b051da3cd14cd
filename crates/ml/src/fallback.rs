use unicode_segmentation::UnicodeSegmentation;

use crate::vector::normalize;
use crate::EmbeddingModel;

const IGNORED_WORDS: &[&str] = &[
    "a", "an", "the", "for", "of", "in", "to", "with", "and", "is", "are", "me", "my", "please",
];

#[derive(Debug, Clone)]
pub struct HashEmbeddingModel {
    dims: usize,
}

impl HashEmbeddingModel {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(32) }
    }
}

impl EmbeddingModel for HashEmbeddingModel {
    fn model_name(&self) -> &'static str {
        "hash-fallback"
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0_f32; self.dims];
        let lower = text.to_lowercase();

        for token in lower
            .unicode_words()
            .filter(|word| !IGNORED_WORDS.contains(word))
        {
            let hash = fnv1a(token.as_bytes());
            let index = (hash as usize) % self.dims;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vec[index] += sign;
        }

        normalize(&mut vec);
        vec
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
