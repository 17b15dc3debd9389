//! OpenAPI document for the pod tracker REST API.
//!
//! Generated by `utoipa` from the handler annotations and DTO schemas.
//! Served at `/openapi.json` and browsable at `/swagger-ui` when the
//! `swagger-ui` feature is on.

use utoipa::OpenApi;

use super::dto::{
    AddColumnRequest, CellDto, ColumnDto, CreateItemRequest, CreatePodRequest, EditValueRequest,
    ItemListResponse, ItemResponse, LogActivityRequest, LogEntryDto, LogListResponse,
    OverrideStateResponse, PaginationMeta, PodDetailResponse, PodListResponse, PodSummaryDto,
    RefreshLogResponse, SetVisibleColumnsRequest, TrendPointDto, TrendResponse, TrendSummaryDto,
    VisibleColumnsResponse,
};
use super::handlers::system::{ColumnTypeInfo, HealthResponse};
use super::handlers::{columns, items, logs, pods, system, trends, values};
use crate::domain::{ColumnType, ItemId, LogEntryId, PodId};
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI document for the pod tracker API.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "pod-tracker API",
        description = "Pods with runtime-defined typed columns, items with default and user values, and an append-only activity log with trend projection.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    tags(
        (name = "Pods", description = "Pod lifecycle"),
        (name = "Columns", description = "Per-pod schema and visible columns"),
        (name = "Items", description = "Items and their effective values"),
        (name = "Values", description = "User overrides"),
        (name = "Activity log", description = "Immutable activity snapshots"),
        (name = "Trends", description = "Per item-column projections of the log"),
        (name = "System", description = "Health and catalog")
    ),
    paths(
        pods::create_pod,
        pods::list_pods,
        pods::get_pod,
        pods::delete_pod,
        pods::load_pod,
        columns::add_column,
        columns::remove_column,
        columns::set_visible_columns,
        items::create_item,
        items::list_items,
        items::get_item,
        items::get_item_compact,
        items::delete_item,
        values::edit_value,
        values::get_override,
        values::clear_override,
        logs::log_activity,
        logs::list_logs,
        logs::refresh_logs,
        trends::get_trend,
        system::health_handler,
        system::column_types_handler,
    ),
    components(schemas(
        PodId,
        ItemId,
        LogEntryId,
        ColumnType,
        ErrorResponse,
        ErrorBody,
        CreatePodRequest,
        PodSummaryDto,
        PodListResponse,
        PodDetailResponse,
        PaginationMeta,
        AddColumnRequest,
        ColumnDto,
        SetVisibleColumnsRequest,
        VisibleColumnsResponse,
        CreateItemRequest,
        CellDto,
        ItemResponse,
        ItemListResponse,
        EditValueRequest,
        OverrideStateResponse,
        LogActivityRequest,
        LogEntryDto,
        LogListResponse,
        RefreshLogResponse,
        TrendPointDto,
        TrendSummaryDto,
        TrendResponse,
        HealthResponse,
        ColumnTypeInfo,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/pods",
            "/api/v1/pods/{id}",
            "/api/v1/pods/{id}/load",
            "/api/v1/pods/{id}/columns",
            "/api/v1/pods/{id}/columns/{name}",
            "/api/v1/pods/{id}/visible-columns",
            "/api/v1/pods/{id}/items",
            "/api/v1/pods/{id}/items/{item_id}",
            "/api/v1/pods/{id}/items/{item_id}/compact",
            "/api/v1/pods/{id}/items/{item_id}/values/{column}",
            "/api/v1/pods/{id}/items/{item_id}/logs",
            "/api/v1/pods/{id}/logs",
            "/api/v1/pods/{id}/logs/refresh",
            "/api/v1/pods/{id}/items/{item_id}/trend/{column}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
