use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_catalog_tables::Migration),
            Box::new(m20250301_000002_create_location_tables::Migration),
            Box::new(m20250301_000003_create_aircraft_table::Migration),
            Box::new(m20250301_000004_create_inventories_table::Migration),
            Box::new(m20250301_000005_create_movement_tables::Migration),
            Box::new(m20250301_000006_create_order_tables::Migration),
        ]
    }
}

mod m20250301_000001_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Items::Mpn).string().not_null())
                        .col(ColumnDef::new(Items::Pn).string().null())
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Doc).string().null())
                        .col(ColumnDef::new(Items::TecPub).string().null())
                        .col(ColumnDef::new(Items::AircraftDoc).string().null())
                        .col(ColumnDef::new(Items::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Items::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Items::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_mpn")
                        .table(Items::Table)
                        .col(Items::Mpn)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ItemEquivalents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemEquivalents::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ItemEquivalents::ItemId).integer().not_null())
                        .col(
                            ColumnDef::new(ItemEquivalents::EquivalentItemId)
                                .integer()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_item_equivalents_item")
                                .from(ItemEquivalents::Table, ItemEquivalents::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_item_equivalents_equivalent_item")
                                .from(ItemEquivalents::Table, ItemEquivalents::EquivalentItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_equivalents_pair")
                        .table(ItemEquivalents::Table)
                        .col(ItemEquivalents::ItemId)
                        .col(ItemEquivalents::EquivalentItemId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ItemEquivalents::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Items {
        Table,
        Id,
        Mpn,
        Pn,
        Name,
        Doc,
        TecPub,
        AircraftDoc,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum ItemEquivalents {
        Table,
        Id,
        ItemId,
        EquivalentItemId,
    }
}

mod m20250301_000002_create_location_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_location_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(LocationSites::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(LocationSites::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(LocationSites::Site).string().not_null())
                        .col(ColumnDef::new(LocationSites::SubSite).string().null())
                        .col(ColumnDef::new(LocationSites::Kind).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Locations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Locations::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Locations::SiteId).integer().not_null())
                        .col(ColumnDef::new(Locations::Section).string().null())
                        .col(ColumnDef::new(Locations::Shelf).integer().null())
                        .col(ColumnDef::new(Locations::CaseNo).integer().null())
                        .col(ColumnDef::new(Locations::ItemNumber).integer().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_locations_site")
                                .from(Locations::Table, Locations::SiteId)
                                .to(LocationSites::Table, LocationSites::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_locations_coordinate")
                        .table(Locations::Table)
                        .col(Locations::SiteId)
                        .col(Locations::Section)
                        .col(Locations::Shelf)
                        .col(Locations::CaseNo)
                        .col(Locations::ItemNumber)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(LocationSites::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum LocationSites {
        Table,
        Id,
        Site,
        SubSite,
        Kind,
    }

    #[derive(DeriveIden)]
    pub(super) enum Locations {
        Table,
        Id,
        SiteId,
        Section,
        Shelf,
        CaseNo,
        ItemNumber,
    }
}

mod m20250301_000003_create_aircraft_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_aircraft_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Aircraft::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Aircraft::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Aircraft::Numeral).string().not_null())
                        .col(ColumnDef::new(Aircraft::Tsn).decimal_len(20, 2).null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Aircraft::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Aircraft {
        Table,
        Id,
        Numeral,
        Tsn,
    }
}

mod m20250301_000004_create_inventories_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_catalog_tables::Items;
    use super::m20250301_000002_create_location_tables::Locations;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_inventories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inventories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inventories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Inventories::ItemId).integer().not_null())
                        .col(ColumnDef::new(Inventories::SerialNumber).string().null())
                        .col(
                            ColumnDef::new(Inventories::Kanban)
                                .string()
                                .not_null()
                                .default("NOT"),
                        )
                        .col(ColumnDef::new(Inventories::LocationId).integer().null())
                        .col(
                            ColumnDef::new(Inventories::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Inventories::MinimumQuantity)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Inventories::ExpirationDate)
                                .timestamp()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventories_item")
                                .from(Inventories::Table, Inventories::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventories_location")
                                .from(Inventories::Table, Inventories::LocationId)
                                .to(Locations::Table, Locations::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            // Bucket lookups are always by item, optionally narrowed to the
            // no-serial rows; uniqueness of the bucket itself is a business
            // rule, not a schema constraint.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventories_item_id")
                        .table(Inventories::Table)
                        .col(Inventories::ItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Inventories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Inventories {
        Table,
        Id,
        ItemId,
        SerialNumber,
        Kanban,
        LocationId,
        Quantity,
        MinimumQuantity,
        ExpirationDate,
    }
}

mod m20250301_000005_create_movement_tables {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_catalog_tables::Items;
    use super::m20250301_000002_create_location_tables::Locations;
    use super::m20250301_000004_create_inventories_table::Inventories;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000005_create_movement_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inflows::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inflows::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Inflows::ItemId).integer().not_null())
                        .col(ColumnDef::new(Inflows::Quantity).integer().not_null())
                        .col(ColumnDef::new(Inflows::Description).text().null())
                        .col(ColumnDef::new(Inflows::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Inflows::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Inflows::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inflows_item")
                                .from(Inflows::Table, Inflows::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inflows_item_id")
                        .table(Inflows::Table)
                        .col(Inflows::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Outflows::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Outflows::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Outflows::InventoryId).integer().not_null())
                        .col(ColumnDef::new(Outflows::Quantity).integer().not_null())
                        .col(ColumnDef::new(Outflows::ClaimantId).integer().not_null())
                        .col(ColumnDef::new(Outflows::Reason).string().null())
                        .col(ColumnDef::new(Outflows::Description).text().null())
                        .col(ColumnDef::new(Outflows::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Outflows::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Outflows::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_outflows_inventory")
                                .from(Outflows::Table, Outflows::InventoryId)
                                .to(Inventories::Table, Inventories::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_outflows_claimant")
                                .from(Outflows::Table, Outflows::ClaimantId)
                                .to(Locations::Table, Locations::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_outflows_inventory_id")
                        .table(Outflows::Table)
                        .col(Outflows::InventoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Outflows::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Inflows::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Inflows {
        Table,
        Id,
        ItemId,
        Quantity,
        Description,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Outflows {
        Table,
        Id,
        InventoryId,
        Quantity,
        ClaimantId,
        Reason,
        Description,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000006_create_order_tables {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_catalog_tables::Items;
    use super::m20250301_000003_create_aircraft_table::Aircraft;
    use super::m20250301_000004_create_inventories_table::Inventories;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000006_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaintenanceOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaintenanceOrders::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceOrders::OrderNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceOrders::OrderYear)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MaintenanceOrders::OrderDate).date().null())
                        .col(ColumnDef::new(MaintenanceOrders::Requester).string().null())
                        .col(ColumnDef::new(MaintenanceOrders::OrderType).string().null())
                        .col(ColumnDef::new(MaintenanceOrders::Status).string().null())
                        .col(ColumnDef::new(MaintenanceOrders::Notes).text().null())
                        .col(ColumnDef::new(MaintenanceOrders::CreatedBy).uuid().null())
                        .col(ColumnDef::new(MaintenanceOrders::UpdatedBy).uuid().null())
                        .col(
                            ColumnDef::new(MaintenanceOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceOrders::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_number_year")
                        .table(MaintenanceOrders::Table)
                        .col(MaintenanceOrders::OrderNumber)
                        .col(MaintenanceOrders::OrderYear)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(MaintenanceOrders::Table)
                        .col(MaintenanceOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::InventoryId).integer().null())
                        .col(ColumnDef::new(OrderItems::ItemId).integer().null())
                        .col(ColumnDef::new(OrderItems::AircraftId).integer().null())
                        .col(
                            ColumnDef::new(OrderItems::AircraftDestinationId)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(OrderItems::Operator).string().null())
                        .col(ColumnDef::new(OrderItems::ServiceType).string().null())
                        .col(
                            ColumnDef::new(OrderItems::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(OrderItems::QuantitySupplied).integer().null())
                        .col(ColumnDef::new(OrderItems::Dpe).string().null())
                        .col(ColumnDef::new(OrderItems::Eglog).string().null())
                        .col(
                            ColumnDef::new(OrderItems::Log)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(OrderItems::SnAttended).string().null())
                        .col(
                            ColumnDef::new(OrderItems::ExpirationDateAttended)
                                .date()
                                .null(),
                        )
                        .col(ColumnDef::new(OrderItems::NfAnswer).string().null())
                        .col(ColumnDef::new(OrderItems::AttendedDate).date().null())
                        .col(
                            ColumnDef::new(OrderItems::Collected)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(OrderItems::Gmm).string().null())
                        .col(ColumnDef::new(OrderItems::Bms).string().null())
                        .col(ColumnDef::new(OrderItems::HbDestination).string().null())
                        .col(
                            ColumnDef::new(OrderItems::ContractOld)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(OrderItems::Reason).text().null())
                        .col(ColumnDef::new(OrderItems::Troubleshooting).text().null())
                        .col(
                            ColumnDef::new(OrderItems::FailureDescription)
                                .text()
                                .null(),
                        )
                        .col(ColumnDef::new(OrderItems::Observation).text().null())
                        .col(ColumnDef::new(OrderItems::Notes).text().null())
                        .col(ColumnDef::new(OrderItems::TsnItem).decimal_len(10, 2).null())
                        .col(ColumnDef::new(OrderItems::TsoItem).decimal_len(10, 2).null())
                        .col(ColumnDef::new(OrderItems::CreatedBy).uuid().null())
                        .col(ColumnDef::new(OrderItems::UpdatedBy).uuid().null())
                        .col(ColumnDef::new(OrderItems::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(OrderItems::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(MaintenanceOrders::Table, MaintenanceOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_inventory")
                                .from(OrderItems::Table, OrderItems::InventoryId)
                                .to(Inventories::Table, Inventories::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_item")
                                .from(OrderItems::Table, OrderItems::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_aircraft")
                                .from(OrderItems::Table, OrderItems::AircraftId)
                                .to(Aircraft::Table, Aircraft::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_aircraft_destination")
                                .from(OrderItems::Table, OrderItems::AircraftDestinationId)
                                .to(Aircraft::Table, Aircraft::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MaintenanceOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MaintenanceOrders {
        Table,
        Id,
        OrderNumber,
        OrderYear,
        OrderDate,
        Requester,
        OrderType,
        Status,
        Notes,
        CreatedBy,
        UpdatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderItems {
        Table,
        Id,
        OrderId,
        InventoryId,
        ItemId,
        AircraftId,
        AircraftDestinationId,
        Operator,
        ServiceType,
        Quantity,
        QuantitySupplied,
        Dpe,
        Eglog,
        Log,
        SnAttended,
        ExpirationDateAttended,
        NfAnswer,
        AttendedDate,
        Collected,
        Gmm,
        Bms,
        HbDestination,
        ContractOld,
        Reason,
        Troubleshooting,
        FailureDescription,
        Observation,
        Notes,
        TsnItem,
        TsoItem,
        CreatedBy,
        UpdatedBy,
        CreatedAt,
        UpdatedAt,
    }
}
