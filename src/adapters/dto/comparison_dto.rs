use serde::{Deserialize, Serialize};

use crate::domain::{controls::comparison::ComparisonView, models::file_record::RecordId};

#[derive(Debug, Serialize, Deserialize)]
pub struct ComparisonResponse {
    #[serde(rename = "inspectedId")]
    pub inspected_id: Option<RecordId>,
    pub position: f64,
}

impl From<&ComparisonView> for ComparisonResponse {
    fn from(view: &ComparisonView) -> Self {
        Self {
            inspected_id: view.inspected(),
            position: view.position(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InspectRequest {
    pub id: Option<RecordId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DragRequest {
    #[serde(rename = "offsetX")]
    pub offset_x: f64,
    pub width: f64,
}
