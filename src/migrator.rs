use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_orders_table::Migration),
            Box::new(m20240101_000002_create_registrations_table::Migration),
            Box::new(m20240101_000003_create_user_profiles_table::Migration),
            Box::new(m20240101_000004_create_products_table::Migration),
            Box::new(m20240101_000005_create_digital_deliveries_table::Migration),
            Box::new(m20240101_000006_create_processed_payments_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::Title).string().not_null())
                        .col(
                            ColumnDef::new(Orders::Amount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Currency).string().not_null())
                        .col(
                            ColumnDef::new(Orders::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::PurchaseKind).string().null())
                        .col(
                            ColumnDef::new(Orders::ExternalReference)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::PreferenceId).string().null())
                        .col(ColumnDef::new(Orders::BuyerEmail).string().null())
                        .col(ColumnDef::new(Orders::CustomerEmail).string().null())
                        .col(ColumnDef::new(Orders::BuyerUid).string().null())
                        .col(ColumnDef::new(Orders::UserId).string().null())
                        .col(ColumnDef::new(Orders::ProductId).string().null())
                        .col(ColumnDef::new(Orders::ProductOptions).json().null())
                        .col(ColumnDef::new(Orders::PaymentId).string().null())
                        .col(ColumnDef::new(Orders::PaidAt).timestamp().null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_external_reference")
                        .table(Orders::Table)
                        .col(Orders::ExternalReference)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_buyer_email")
                        .table(Orders::Table)
                        .col(Orders::BuyerEmail)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_buyer_uid")
                        .table(Orders::Table)
                        .col(Orders::BuyerUid)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Orders {
        Table,
        Id,
        Title,
        Amount,
        Currency,
        Quantity,
        Status,
        PurchaseKind,
        ExternalReference,
        PreferenceId,
        BuyerEmail,
        CustomerEmail,
        BuyerUid,
        UserId,
        ProductId,
        ProductOptions,
        PaymentId,
        PaidAt,
        CreatedAt,
    }
}

mod m20240101_000002_create_registrations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_registrations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Registrations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Registrations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Registrations::EventName).string().not_null())
                        .col(ColumnDef::new(Registrations::BuyerEmail).string().null())
                        .col(ColumnDef::new(Registrations::BuyerUid).string().null())
                        .col(ColumnDef::new(Registrations::Amount).decimal().null())
                        .col(ColumnDef::new(Registrations::Status).string().not_null())
                        .col(
                            ColumnDef::new(Registrations::ExternalReference)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Registrations::PaymentId).string().null())
                        .col(ColumnDef::new(Registrations::PaymentStatus).string().null())
                        .col(ColumnDef::new(Registrations::PaidAt).timestamp().null())
                        .col(
                            ColumnDef::new(Registrations::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_registrations_external_reference")
                        .table(Registrations::Table)
                        .col(Registrations::ExternalReference)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Registrations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Registrations {
        Table,
        Id,
        EventName,
        BuyerEmail,
        BuyerUid,
        Amount,
        Status,
        ExternalReference,
        PaymentId,
        PaymentStatus,
        PaidAt,
        CreatedAt,
    }
}

mod m20240101_000003_create_user_profiles_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_user_profiles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UserProfiles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserProfiles::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UserProfiles::Uid).string().not_null())
                        .col(ColumnDef::new(UserProfiles::Email).string().not_null())
                        .col(ColumnDef::new(UserProfiles::DisplayName).string().null())
                        .col(ColumnDef::new(UserProfiles::Phone).string().null())
                        .col(
                            ColumnDef::new(UserProfiles::Tokens)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(UserProfiles::Role)
                                .string()
                                .not_null()
                                .default("user"),
                        )
                        .col(
                            ColumnDef::new(UserProfiles::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UserProfiles::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_user_profiles_uid")
                        .table(UserProfiles::Table)
                        .col(UserProfiles::Uid)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_user_profiles_email")
                        .table(UserProfiles::Table)
                        .col(UserProfiles::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserProfiles::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum UserProfiles {
        Table,
        Id,
        Uid,
        Email,
        DisplayName,
        Phone,
        Tokens,
        Role,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::Kind).string().not_null())
                        .col(ColumnDef::new(Products::DownloadUrl).string().null())
                        .col(ColumnDef::new(Products::MapNames).json().null())
                        .col(ColumnDef::new(Products::WhatsappNumber).string().null())
                        .col(
                            ColumnDef::new(Products::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Products {
        Table,
        Id,
        Name,
        Price,
        Kind,
        DownloadUrl,
        MapNames,
        WhatsappNumber,
        Active,
        CreatedAt,
    }
}

mod m20240101_000005_create_digital_deliveries_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_digital_deliveries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DigitalDeliveries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DigitalDeliveries::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DigitalDeliveries::OrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DigitalDeliveries::BuyerEmail)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(DigitalDeliveries::BuyerName).string().null())
                        .col(
                            ColumnDef::new(DigitalDeliveries::ProductId)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(DigitalDeliveries::ProductName)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(DigitalDeliveries::DownloadLinks)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DigitalDeliveries::Status)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DigitalDeliveries::PaymentId).string().null())
                        .col(
                            ColumnDef::new(DigitalDeliveries::DeliveredAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DigitalDeliveries::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One delivery per order, enforced at the schema level.
            manager
                .create_index(
                    Index::create()
                        .name("idx_digital_deliveries_order_id")
                        .table(DigitalDeliveries::Table)
                        .col(DigitalDeliveries::OrderId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DigitalDeliveries::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum DigitalDeliveries {
        Table,
        Id,
        OrderId,
        BuyerEmail,
        BuyerName,
        ProductId,
        ProductName,
        DownloadLinks,
        Status,
        PaymentId,
        DeliveredAt,
        CreatedAt,
    }
}

mod m20240101_000006_create_processed_payments_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_processed_payments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProcessedPayments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProcessedPayments::PaymentId)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProcessedPayments::ExternalReference)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProcessedPayments::Outcome)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProcessedPayments::ProcessedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProcessedPayments::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ProcessedPayments {
        Table,
        PaymentId,
        ExternalReference,
        Outcome,
        ProcessedAt,
    }
}
