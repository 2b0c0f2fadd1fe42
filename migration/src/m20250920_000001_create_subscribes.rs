use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Subscribes {
    Table,
    Id,
    ServiceName,
    Price,
    UserId,
    StartDate,
    EndDate,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscribes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscribes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Subscribes::ServiceName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscribes::Price)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscribes::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscribes::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscribes::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // The list endpoint filters by exact match on these two columns.
        manager
            .create_index(
                Index::create()
                    .name("idx_subscribes_user_id")
                    .table(Subscribes::Table)
                    .col(Subscribes::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscribes_service_name")
                    .table(Subscribes::Table)
                    .col(Subscribes::ServiceName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscribes::Table).to_owned())
            .await
    }
}
