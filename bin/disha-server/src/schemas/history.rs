use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::schemas::chat::MessageDto;

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    pub user_id: i64,
    /// Only messages with a smaller id are returned.
    pub before_id: Option<i64>,
    /// Page size, 1 to 50.
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 50, default = 20)]
    #[validate(range(min = 1, max = 50))]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryData {
    /// Oldest first.
    pub messages: Vec<MessageDto>,
    pub has_more: bool,
}
