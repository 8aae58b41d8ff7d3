use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::UserKind;

/// The authenticated caller, resolved from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub kind: UserKind,
}

impl User {
    pub fn new(id: Uuid, kind: UserKind) -> Self {
        Self { id, kind }
    }

    fn has_role(&self, role: String) -> bool {
        self.kind.name() == role
    }
}

impl PolarClass for User {
    fn get_polar_class_builder() -> oso::ClassBuilder<User> {
        oso::Class::builder()
            .name("User")
            .add_attribute_getter("id", |recv: &User| recv.id)
            .add_attribute_getter("kind", |recv: &User| recv.kind.name().to_string())
            .add_method("has_role", User::has_role)
    }

    fn get_polar_class() -> oso::Class {
        let builder = User::get_polar_class_builder();
        builder.build()
    }
}
