//! Forwarding ledger and cleared-limit records.
//!
//! Ledger rows keep `voucher_id` without a foreign key so the audit trail
//! survives voucher deletion.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ForwardingLedger {
    Table,
    Id,
    VoucherId,
    AmountMinor,
    ForwardedAt,
    IsReversed,
    ReversedAt,
    ReversalReason,
}

#[derive(Iden)]
enum ClearedLimits {
    Table,
    Id,
    PeriodKind,
    PeriodStart,
    PeriodEnd,
    ClearedMinor,
    ClearedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ForwardingLedger::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ForwardingLedger::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ForwardingLedger::VoucherId).string().not_null())
                    .col(
                        ColumnDef::new(ForwardingLedger::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ForwardingLedger::ForwardedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ForwardingLedger::IsReversed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ForwardingLedger::ReversedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ForwardingLedger::ReversalReason).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-forwarding_ledger-voucher_id")
                    .table(ForwardingLedger::Table)
                    .col(ForwardingLedger::VoucherId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClearedLimits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClearedLimits::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClearedLimits::PeriodKind).string().not_null())
                    .col(
                        ColumnDef::new(ClearedLimits::PeriodStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClearedLimits::PeriodEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClearedLimits::ClearedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClearedLimits::ClearedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cleared_limits-period-unique")
                    .table(ClearedLimits::Table)
                    .col(ClearedLimits::PeriodKind)
                    .col(ClearedLimits::PeriodStart)
                    .col(ClearedLimits::PeriodEnd)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClearedLimits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ForwardingLedger::Table).to_owned())
            .await?;
        Ok(())
    }
}
