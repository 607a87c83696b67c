use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Per-user watch state for one remote movie. Display fields are copied
/// from the catalog so lists render without a network round trip.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub remote_id: i32,
    pub user_id: String,
    pub title: String,
    pub poster_path: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub overview: String,
    pub release_date: Option<String>,
    pub is_favorite: bool,
    pub is_watched: bool,
    pub is_want_to_watch: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
