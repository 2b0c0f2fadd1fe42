use chrono::{DateTime, Utc};
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::subscribes;
use crate::error::{AppError, AppResult};

/// Wire shape of a subscription. Every field defaults when missing from the
/// payload, and those defaults double as the "not provided" sentinels the
/// partial-update merge keys on: empty strings, `None` price and dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubscribeDto {
    #[serde(default)]
    #[schema(example = 1)]
    pub id: i64,
    #[serde(default)]
    #[schema(example = "Netflix")]
    pub service_name: String,
    #[serde(default)]
    #[schema(example = 199)]
    pub price: Option<i64>,
    #[serde(default)]
    #[schema(example = "u1")]
    pub user_id: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl SubscribeDto {
    /// Full validation, used for create and full replace. A present price of
    /// zero is fine; only the absent sentinel fails.
    pub fn validate(&self) -> AppResult<()> {
        if self.service_name.is_empty()
            || self.price.is_none()
            || self.user_id.is_empty()
            || self.start_date.is_none()
        {
            return Err(AppError::MissingRequiredFields);
        }
        self.validate_dates()
    }

    /// Date-order check over whatever dates are present. Equal dates pass;
    /// an open end or an absent start is not an ordering violation.
    pub fn validate_dates(&self) -> AppResult<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(AppError::InvalidDateRange);
        }
        Ok(())
    }

    /// Row form for inserts and updates. Callers run `validate` (or merge
    /// against a stored row) first; the id is left to the store.
    pub fn to_active_model(&self) -> AppResult<subscribes::ActiveModel> {
        let (Some(price), Some(start_date)) = (self.price, self.start_date) else {
            return Err(AppError::MissingRequiredFields);
        };
        Ok(subscribes::ActiveModel {
            id: NotSet,
            service_name: Set(self.service_name.clone()),
            price: Set(price),
            user_id: Set(self.user_id.clone()),
            start_date: Set(start_date),
            end_date: Set(self.end_date),
        })
    }
}

impl From<subscribes::Model> for SubscribeDto {
    fn from(row: subscribes::Model) -> Self {
        Self {
            id: row.id,
            service_name: row.service_name,
            price: Some(row.price),
            user_id: row.user_id,
            start_date: Some(row.start_date),
            end_date: row.end_date,
        }
    }
}

/// Computes the record to persist for an update. A full replace takes the
/// payload verbatim; a partial update falls back to the stored value for
/// every field the payload left at its absent sentinel. The path id always
/// wins over anything carried in either record.
pub fn merge(
    existing: &SubscribeDto,
    incoming: &SubscribeDto,
    partial: bool,
    id: i64,
) -> SubscribeDto {
    if !partial {
        return SubscribeDto {
            id,
            ..incoming.clone()
        };
    }
    SubscribeDto {
        id,
        service_name: if incoming.service_name.is_empty() {
            existing.service_name.clone()
        } else {
            incoming.service_name.clone()
        },
        price: incoming.price.or(existing.price),
        user_id: if incoming.user_id.is_empty() {
            existing.user_id.clone()
        } else {
            incoming.user_id.clone()
        },
        start_date: incoming.start_date.or(existing.start_date),
        end_date: incoming.end_date.or(existing.end_date),
    }
}

/// `sort`/`value` query pair of the list endpoint, with both parameters
/// optional on the wire.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub value: String,
}

/// Lookup strategy the list endpoint resolves its query pair into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    All,
    ByUserId(String),
    ByServiceName(String),
}

impl ListFilter {
    /// The `sort` token is case-insensitive; the `value` is matched exactly
    /// by the store. Setting one parameter without the other is an error.
    pub fn resolve(sort: &str, value: &str) -> AppResult<Self> {
        if sort.is_empty() != value.is_empty() {
            return Err(AppError::InvalidQuery(
                "The 'sort' or 'value' parameters are missing. Please fill in both parameters"
                    .to_string(),
            ));
        }
        match sort.to_uppercase().as_str() {
            "" => Ok(ListFilter::All),
            "USER_ID" => Ok(ListFilter::ByUserId(value.to_string())),
            "SERVICE_NAME" => Ok(ListFilter::ByServiceName(value.to_string())),
            _ => Err(AppError::InvalidQuery(
                "Incorrect 'sort' parameter. The 'sort' can only be empty or have the values \
                 'SERVICE_NAME' and 'USER_ID'"
                    .to_string(),
            )),
        }
    }
}
