pub use crate::*;
pub use anyhow::{Result as R, anyhow};

pub use memmap2::MmapOptions;
pub use rayon::prelude::*;
