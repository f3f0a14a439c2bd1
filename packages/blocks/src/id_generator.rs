use crc32fast::Hasher;

use crate::{BlockId, BlockTree};

/// Derive a short, stable seed from a page id using CRC32
pub fn get_page_seed(page_id: &str) -> String {
    let mut buff = String::from(page_id);
    if !page_id.starts_with("page://") {
        buff = format!("page://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential block id generator scoped to one page
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Page seed (CRC32)
    count: u64,   // Sequential counter
}

impl IdGenerator {
    pub fn new(page_id: &str) -> Self {
        Self {
            seed: get_page_seed(page_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generator for an existing tree: the counter starts past every id
    /// already issued under the same seed, so ids are never reused.
    pub fn for_tree(page_id: &str, tree: &BlockTree) -> Self {
        let mut generator = Self::new(page_id);
        let nodes = tree.flatten();

        loop {
            let prefix = format!("{}-", generator.seed);
            generator.count = nodes
                .iter()
                .filter_map(|node| node.id.as_str().strip_prefix(&prefix))
                .filter_map(|suffix| suffix.parse::<u64>().ok())
                .max()
                .unwrap_or(0);

            if generator.count < u64::MAX {
                return generator;
            }
            generator.next_seed();
        }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> BlockId {
        match self.count.checked_add(1) {
            Some(count) => self.count = count,
            None => {
                self.next_seed();
                self.count = 1;
            }
        }
        BlockId::new(format!("{}-{}", self.seed, self.count))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    // Counter exhausted: continue under a derived seed
    fn next_seed(&mut self) {
        self.seed.push('x');
    }
}
