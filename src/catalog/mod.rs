//! Client-side catalog logic: reshaping, filtering, the contribution selector
//! and the view counter.

pub mod filter;
pub mod normalize;
pub mod selector;
pub mod view_counter;
