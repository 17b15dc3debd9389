//! Request and response DTOs for the REST API.

pub mod column_dto;
pub mod common_dto;
pub mod item_dto;
pub mod log_dto;
pub mod pod_dto;
pub mod trend_dto;

pub use column_dto::{AddColumnRequest, ColumnDto, SetVisibleColumnsRequest, VisibleColumnsResponse};
pub use common_dto::{ANONYMOUS_ACTOR, ActorParams, PaginationMeta, PaginationParams};
pub use item_dto::{
    CellDto, CreateItemRequest, EditValueRequest, ItemListResponse, ItemResponse,
    OverrideStateResponse,
};
pub use log_dto::{
    LogActivityRequest, LogEntryDto, LogListResponse, LogQueryParams, RefreshLogResponse,
};
pub use pod_dto::{CreatePodRequest, PodDetailResponse, PodListParams, PodListResponse, PodSummaryDto};
pub use trend_dto::{TrendPointDto, TrendResponse, TrendSummaryDto};
