// src/services/route_auth.rs

use uuid::Uuid;

use crate::models::auth::User;

/// A loja está na rota do usuário?
///
/// Decisão pura: quem chama transforma o `false` em "proibido".
pub fn user_has_store_in_route(user: &User, store_id: Uuid) -> bool {
    user.route.contains(&store_id)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;

    use super::*;
    use crate::models::auth::Role;

    fn agent(route: BTreeSet<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Agente".into(),
            email: "agente@rutas.test".into(),
            password_hash: String::new(),
            role: Role::User,
            route,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_route_never_authorizes() {
        let user = agent(BTreeSet::new());
        assert!(!user_has_store_in_route(&user, Uuid::new_v4()));
    }

    #[test]
    fn membership_decides() {
        let s1 = Uuid::new_v4();
        let s2 = Uuid::new_v4();
        let mut user = agent(BTreeSet::from([s1]));

        assert!(user_has_store_in_route(&user, s1));
        assert!(!user_has_store_in_route(&user, s2));

        user.route.insert(s2);
        assert!(user_has_store_in_route(&user, s2));
    }
}
