pub mod compression;
pub mod forward_pass;

pub use compression::{Block, BlockPartition, Compression, CompressionReport};
pub use forward_pass::{ForwardPass, PassReport};
