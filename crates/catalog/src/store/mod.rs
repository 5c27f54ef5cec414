//! The state container: commands, pure reducers, effects, derived views.
//!
//! Data flow: a consumer dispatches an intent (or calls an effect method),
//! the effect performs network I/O, the outcome reduces into canonical
//! state, derived views recompute, and the consumer re-reads.

pub mod command;
pub mod debounce;
mod effects;
pub mod reducer;
pub mod selectors;
pub mod state;

pub use command::{CartCommand, Command, ProductsCommand};
pub use debounce::SearchDebouncer;
pub use effects::CatalogStore;
pub use selectors::{CatalogStats, DisplayRange, PageItem, SelectionStats};
pub use state::{CartState, CatalogState, ProductsState};
