//! User entity <-> model mapper

use session_core::{SubjectId, User};

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: SubjectId::new(model.id),
            email: model.email,
            password_hash: model.password_hash,
            created_at: model.created_at,
        }
    }
}
