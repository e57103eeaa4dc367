use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "facility")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::tour::Entity> for Entity {
    fn to() -> RelationDef {
        super::tour_facility::Relation::Tour.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::tour_facility::Relation::Facility.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
