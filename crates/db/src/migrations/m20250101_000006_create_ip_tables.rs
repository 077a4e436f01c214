//! Create visitor address and post view tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ip::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ip::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Ip::Address).string_len(45).not_null())
                    .col(
                        ColumnDef::new(Ip::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: address (lookup only; uniqueness is not enforced here)
        manager
            .create_index(
                Index::create()
                    .name("idx_ip_address")
                    .table(Ip::Table)
                    .col(Ip::Address)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (daily visitor count)
        manager
            .create_index(
                Index::create()
                    .name("idx_ip_created_at")
                    .table(Ip::Table)
                    .col(Ip::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostView::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostView::PostId).string_len(32).not_null())
                    .col(ColumnDef::new(PostView::IpId).string_len(32).not_null())
                    .primary_key(
                        Index::create()
                            .col(PostView::PostId)
                            .col(PostView::IpId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_view_post")
                            .from(PostView::Table, PostView::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_view_ip")
                            .from(PostView::Table, PostView::IpId)
                            .to(Ip::Table, Ip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostView::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ip::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Ip {
    Table,
    Id,
    Address,
    CreatedAt,
}

#[derive(Iden)]
enum PostView {
    Table,
    PostId,
    IpId,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}
