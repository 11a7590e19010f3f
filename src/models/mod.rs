pub mod filter;
pub mod genre;
pub mod movie;
pub mod query;
pub mod validation;

pub use filter::{
    DualRange, FilterControls, FilterState, Keyword, RangeBounds, ReleaseType, ReleaseWindow,
    SortKey, TrackFill, ValueRange, RUNTIME_BOUNDS, SCORE_BOUNDS, VOTE_COUNT_BOUNDS,
};
pub use genre::{find_genre, Genre, GENRES};
pub use movie::{Country, KeywordSuggestion, MovieRecord, ResultPage};
pub use query::CatalogQuery;
pub use validation::ValidationError;
