use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment_flag)]
    pub id: i32,
    pub title: String,
    pub price: f64,
    pub location: String,
    pub description: String,
    pub image: Option<String>,
    pub availability: bool,
}

impl ActiveModelBehavior for ActiveModel {}
