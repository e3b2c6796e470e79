use axum::Json;
use serde::Deserialize;

use crate::{
    auth::AdminOnly,
    catalog::{Segment, SegmentEdit},
};

/// Segment as currently shown in the form, plus the edit just made
#[derive(Deserialize)]
pub struct ApplyEditRequest {
    pub segment: Segment,
    pub edit: SegmentEdit,
}

/// GET /api/segments/new - Blank time code for the upload form
pub async fn new_segment(AdminOnly(_user): AdminOnly) -> Json<Segment> {
    Json(Segment::default())
}

/// POST /api/segments/apply - Apply one form edit and return the new segment
pub async fn apply_edit(
    AdminOnly(_user): AdminOnly,
    Json(request): Json<ApplyEditRequest>,
) -> Json<Segment> {
    Json(request.segment.apply(request.edit))
}
