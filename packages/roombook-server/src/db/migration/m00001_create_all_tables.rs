use crate::db::{bookings, reviews, rooms, tokens, users};
use sea_orm::sea_query::{ForeignKey, ForeignKeyAction, Index, Table};
use sea_orm::{DbErr, DeriveMigrationName};
use sea_orm_migration::{MigrationTrait, SchemaManager, schema};

#[derive(DeriveMigrationName)]
pub(crate) struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let rooms_table = Table::create()
            .table(rooms::Entity)
            .if_not_exists()
            .col(schema::pk_auto(rooms::Column::Id))
            .col(schema::string(rooms::Column::Title))
            .col(schema::double(rooms::Column::Price))
            .col(schema::string(rooms::Column::Location))
            .col(schema::text(rooms::Column::Description))
            .col(schema::string_null(rooms::Column::Image))
            .col(schema::boolean(rooms::Column::Availability).default(true))
            .to_owned();

        let users_table = Table::create()
            .table(users::Entity)
            .if_not_exists()
            .col(schema::uuid(users::Column::Id).primary_key())
            .col(schema::string_uniq(users::Column::Email))
            .col(schema::string(users::Column::Name))
            .col(schema::string(users::Column::PasswordHash))
            .col(schema::boolean(users::Column::IsAdmin).default(false))
            .col(schema::boolean(users::Column::IsSuperuser).default(false))
            .col(schema::boolean(users::Column::TermsAccepted).default(false))
            .col(schema::timestamp_with_time_zone(users::Column::CreatedAt))
            .col(schema::timestamp_with_time_zone(users::Column::UpdatedAt))
            .to_owned();

        let bookings_table = Table::create()
            .table(bookings::Entity)
            .if_not_exists()
            .col(schema::pk_auto(bookings::Column::Id))
            .col(schema::uuid(bookings::Column::UserId))
            .col(schema::integer(bookings::Column::RoomId))
            .col(schema::timestamp_with_time_zone(bookings::Column::BookingDate))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_bookings_user")
                    .from(bookings::Entity, bookings::Column::UserId)
                    .to(users::Entity, users::Column::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_bookings_room")
                    .from(bookings::Entity, bookings::Column::RoomId)
                    .to(rooms::Entity, rooms::Column::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();

        // 并发重复预订由存储层拒绝
        let bookings_unique = Index::create()
            .name("idx_bookings_user_room")
            .table(bookings::Entity)
            .col(bookings::Column::UserId)
            .col(bookings::Column::RoomId)
            .unique()
            .if_not_exists()
            .to_owned();

        let reviews_table = Table::create()
            .table(reviews::Entity)
            .if_not_exists()
            .col(schema::pk_auto(reviews::Column::Id))
            .col(schema::uuid(reviews::Column::UserId))
            .col(schema::integer(reviews::Column::RoomId))
            .col(schema::small_integer(reviews::Column::Rating))
            .col(schema::text_null(reviews::Column::Comment))
            .col(schema::timestamp_with_time_zone(reviews::Column::CreatedAt))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_reviews_user")
                    .from(reviews::Entity, reviews::Column::UserId)
                    .to(users::Entity, users::Column::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_reviews_room")
                    .from(reviews::Entity, reviews::Column::RoomId)
                    .to(rooms::Entity, rooms::Column::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();

        let tokens_table = Table::create()
            .table(tokens::Entity)
            .if_not_exists()
            .col(schema::pk_auto(tokens::Column::Id))
            .col(schema::string_uniq(tokens::Column::Jti))
            .col(schema::string_uniq(tokens::Column::TokenHash))
            .col(schema::uuid(tokens::Column::UserId))
            .col(schema::timestamp_with_time_zone(tokens::Column::CreatedAt))
            .col(schema::timestamp_with_time_zone(tokens::Column::ExpiresAt))
            .col(schema::timestamp_with_time_zone_null(tokens::Column::RevokedAt))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_tokens_user")
                    .from(tokens::Entity, tokens::Column::UserId)
                    .to(users::Entity, users::Column::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();

        manager.create_table(rooms_table).await?;
        manager.create_table(users_table).await?;
        manager.create_table(bookings_table).await?;
        manager.create_index(bookings_unique).await?;
        manager.create_table(reviews_table).await?;
        manager.create_table(tokens_table).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(tokens::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(reviews::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(bookings::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(users::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(rooms::Entity).to_owned())
            .await
    }
}
