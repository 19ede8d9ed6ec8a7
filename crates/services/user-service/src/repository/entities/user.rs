//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{PasswordDigest, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Always stored lower-cased; unique on LOWER(email)
    pub email: String,
    pub password_digest: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            name: model.name,
            email: model.email,
            password_digest: PasswordDigest::from_hash(model.password_digest),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
