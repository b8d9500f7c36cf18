//! Initial schema: settings, vouchers and their wagers.
//!
//! - `settings`: single configuration row (id = 1)
//! - `vouchers`: submitted bet slips
//! - `wagers`: one row per 3-digit bet, cascading with its voucher

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Settings {
    Table,
    Id,
    CommissionHundredths,
    DailyLimitMinor,
    WeeklyLimitMinor,
    MonthlyLimitMinor,
    DirectMultiplierHundredths,
    RolledMultiplierHundredths,
    UpdatedAt,
}

#[derive(Iden)]
enum Vouchers {
    Table,
    Id,
    RawText,
    TotalMinor,
    WagerCount,
    CreatedAt,
    IsForwarded,
    ForwardedAt,
    Notes,
}

#[derive(Iden)]
enum Wagers {
    Table,
    Id,
    VoucherId,
    Position,
    Number,
    Kind,
    StakeMinor,
    MultiplierHundredths,
    PotentialPayoutMinor,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Settings::CommissionHundredths)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settings::DailyLimitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settings::WeeklyLimitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settings::MonthlyLimitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settings::DirectMultiplierHundredths)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settings::RolledMultiplierHundredths)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vouchers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vouchers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vouchers::RawText).text().not_null())
                    .col(ColumnDef::new(Vouchers::TotalMinor).big_integer().not_null())
                    .col(ColumnDef::new(Vouchers::WagerCount).integer().not_null())
                    .col(
                        ColumnDef::new(Vouchers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vouchers::IsForwarded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Vouchers::ForwardedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Vouchers::Notes).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vouchers-is_forwarded-created_at")
                    .table(Vouchers::Table)
                    .col(Vouchers::IsForwarded)
                    .col(Vouchers::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Wagers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wagers::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Wagers::VoucherId).string().not_null())
                    .col(ColumnDef::new(Wagers::Position).integer().not_null())
                    .col(ColumnDef::new(Wagers::Number).string_len(3).not_null())
                    .col(ColumnDef::new(Wagers::Kind).string().not_null())
                    .col(ColumnDef::new(Wagers::StakeMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Wagers::MultiplierHundredths)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Wagers::PotentialPayoutMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wagers-voucher_id")
                            .from(Wagers::Table, Wagers::VoucherId)
                            .to(Vouchers::Table, Vouchers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wagers-voucher_id-position")
                    .table(Wagers::Table)
                    .col(Wagers::VoucherId)
                    .col(Wagers::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wagers-number")
                    .table(Wagers::Table)
                    .col(Wagers::Number)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Wagers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vouchers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;
        Ok(())
    }
}
