use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_service_orders_table::Migration),
            Box::new(m20250301_000002_create_service_parts_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250301_000001_create_service_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_service_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceOrders::ServiceName)
                                .string_len(120)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceOrders::Area)
                                .string_len(80)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceOrders::TechnicianName)
                                .string_len(120)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(ServiceOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceOrders::TotalCost)
                                .decimal_len(18, 2)
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            // Listing orders by recency is the hot path.
            manager
                .create_index(
                    Index::create()
                        .name("idx_service_orders_created_at")
                        .table(ServiceOrders::Table)
                        .col(ServiceOrders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_service_orders_area")
                        .table(ServiceOrders::Table)
                        .col(ServiceOrders::Area)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum ServiceOrders {
        Table,
        Id,
        ServiceName,
        Area,
        TechnicianName,
        Status,
        CreatedAt,
        TotalCost,
    }
}

mod m20250301_000002_create_service_parts_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_service_orders_table::ServiceOrders;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_service_parts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceParts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceParts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceParts::PartName)
                                .string_len(120)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceParts::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(ServiceParts::UnitPrice)
                                .decimal_len(18, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceParts::ServiceOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_service_parts_service_order_id")
                                .from(ServiceParts::Table, ServiceParts::ServiceOrderId)
                                .to(ServiceOrders::Table, ServiceOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_service_parts_service_order_id")
                        .table(ServiceParts::Table)
                        .col(ServiceParts::ServiceOrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceParts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ServiceParts {
        Table,
        Id,
        PartName,
        Quantity,
        UnitPrice,
        ServiceOrderId,
    }
}
