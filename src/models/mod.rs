pub mod earnings;
pub mod query;

pub use earnings::EarningsRecord;
pub use query::{
    DateRange, PageInfo, PageSlot, QueryParams, QueryResult, SectorFilter, SectorOption,
    SortDirection, SortKey, SortSpec, SortValue, Stats, DATE_RANGE_OPTIONS, DEFAULT_PAGE_SIZE,
    PAGE_SIZE_OPTIONS,
};
