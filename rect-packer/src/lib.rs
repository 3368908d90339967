//! Greedy best-fit packing of rectangles into a single integer-grid bin.
//!
//! ```
//! use rect_packer::{pack, Bin, Item};
//!
//! let items = [Item::new(2, 2)?, Item::new(4, 1)?];
//! let result = pack(Bin::new(4, 3)?, &items);
//! assert_eq!(result.placements.len(), 2);
//! assert_eq!(result.waste, 4);
//! # Ok::<(), rect_packer::Error>(())
//! ```

mod error;
mod pack;
pub use error::*;
pub use pack::*;
pub mod grid;
pub mod render;
