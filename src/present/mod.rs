//! Presentation Models
//!
//! Chart-ready, serializable views of a built page. Nothing here draws;
//! renderers (the HTTP API, the CLI) consume these models.
//!
//! - [`ChainColors`]: one color per chain, shared by every chart
//! - [`DominanceChart`]: stacked area of chain share over time
//! - [`PieChart`]: latest top-N breakdown
//! - [`TokenListRow`]: formatted chains table

mod colors;
mod dominance;
pub mod format;
mod pie;
mod token_list;

pub use colors::{ChainColors, OTHER_COLOR};
pub use dominance::{dominance_chart, AreaSeries, DisplayMode, DominanceChart, DominancePoint, TooltipItem};
pub use pie::{pie_chart, PieChart, PieSlice};
pub use token_list::{token_list, TokenListRow, TOKEN_LIST_HEADERS};
