pub mod autocomplete;
pub mod change_detector;
pub mod pagination;
pub mod renderer;
pub mod scheduler;
pub mod session;

pub use autocomplete::{AutocompleteView, KeywordAutocomplete};
pub use change_detector::{ChangeDetector, ControlPlacement, FilterStatus};
pub use pagination::{FetchOutcome, PageUpdate, ResultCache};
pub use renderer::{CardLayout, MovieCard, RatingColor, ResultRenderer, ResultView};
pub use scheduler::Debouncer;
pub use session::{Activity, DiscoverSession, SelectOption, SessionView};
