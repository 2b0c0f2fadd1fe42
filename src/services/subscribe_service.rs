use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use crate::entities::subscribes;
use crate::error::{AppError, AppResult};
use crate::models::{ListFilter, SubscribeDto, merge};

#[derive(Clone)]
pub struct SubscribeService {
    pool: Arc<DatabaseConnection>,
}

impl SubscribeService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Validates and persists a new subscription, returning the id the
    /// store assigned to it.
    pub async fn create(&self, dto: &SubscribeDto) -> AppResult<i64> {
        dto.validate()?;
        let row = dto
            .to_active_model()?
            .insert(self.pool.as_ref())
            .await
            .map_err(|e| AppError::store("Failed to create the subscribe", e))?;
        Ok(row.id)
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<SubscribeDto> {
        let row = subscribes::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await
            .map_err(|e| AppError::store(format!("Failed to get the subscribe with id = {id}"), e))?;
        row.map(SubscribeDto::from).ok_or(AppError::NotFound(id))
    }

    /// A filter that matches no rows is a successful empty list, never an
    /// error.
    pub async fn list(&self, filter: &ListFilter) -> AppResult<Vec<SubscribeDto>> {
        let query = match filter {
            ListFilter::All => subscribes::Entity::find(),
            ListFilter::ByUserId(user_id) => {
                subscribes::Entity::find().filter(subscribes::Column::UserId.eq(user_id.clone()))
            }
            ListFilter::ByServiceName(service_name) => subscribes::Entity::find()
                .filter(subscribes::Column::ServiceName.eq(service_name.clone())),
        };
        let rows = query
            .all(self.pool.as_ref())
            .await
            .map_err(|e| AppError::store("Failed to get the subscribe list", e))?;
        Ok(rows.into_iter().map(SubscribeDto::from).collect())
    }

    /// Full replace (`partial == false`) validates the payload as a new
    /// record and never reads the stored one. Partial update loads the
    /// stored record, fills absent fields from it, and re-checks the date
    /// order of the combination before writing.
    pub async fn update(&self, id: i64, dto: &SubscribeDto, partial: bool) -> AppResult<()> {
        let effective = if partial {
            let existing = self.find_by_id(id).await?;
            let merged = merge(&existing, dto, true, id);
            merged.validate_dates()?;
            merged
        } else {
            dto.validate()?;
            merge(&SubscribeDto::default(), dto, false, id)
        };

        let mut row = effective.to_active_model()?;
        row.id = Set(id);
        match row.update(self.pool.as_ref()).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound(id)),
            Err(e) => Err(AppError::store(
                format!("Failed to update the subscribe with id = {id}"),
                e,
            )),
        }
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = subscribes::Entity::delete_by_id(id)
            .exec(self.pool.as_ref())
            .await
            .map_err(|e| {
                AppError::store(format!("Failed to delete the subscribe with id = {id}"), e)
            })?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(id));
        }
        Ok(())
    }
}
