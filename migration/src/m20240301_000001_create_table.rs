use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(string(Users::Id).primary_key())
                    .col(string(Users::Email))
                    .col(string_null(Users::Nickname))
                    .col(string_null(Users::ProfileImageUrl))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(integer(Movies::RemoteId))
                    .col(string(Movies::UserId))
                    .col(string(Movies::Title))
                    .col(string_null(Movies::PosterPath))
                    .col(text(Movies::Overview))
                    .col(string_null(Movies::ReleaseDate))
                    .col(boolean(Movies::IsFavorite).default(false))
                    .col(boolean(Movies::IsWatched).default(false))
                    .col(boolean(Movies::IsWantToWatch).default(false))
                    .to_owned(),
            )
            .await?;

        // One row per (movie, user) pair; upserts conflict on this index.
        manager
            .create_index(
                Index::create()
                    .name("idx_movies_remote_user_unique")
                    .table(Movies::Table)
                    .col(Movies::RemoteId)
                    .col(Movies::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_user_id")
                    .table(Movies::Table)
                    .col(Movies::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Nickname,
    ProfileImageUrl,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    RemoteId,
    UserId,
    Title,
    PosterPath,
    Overview,
    ReleaseDate,
    IsFavorite,
    IsWatched,
    IsWantToWatch,
}
