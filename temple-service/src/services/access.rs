//! Principal to role resolution.

use crate::error::TempleError;
use crate::models::{Caller, UserRole};
use crate::services::repository::Store;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct AccessControl {
    store: Arc<dyn Store>,
}

impl AccessControl {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Grant admin to each configured principal. Existing assignments are
    /// overwritten.
    #[instrument(skip(self, principals), fields(count = principals.len()))]
    pub async fn bootstrap_admins(&self, principals: &[String]) -> Result<(), TempleError> {
        for principal in principals {
            self.store.assign_role(principal, UserRole::Admin).await?;
        }
        if !principals.is_empty() {
            info!("Bootstrap admins assigned");
        }
        Ok(())
    }

    /// No principal means guest; a principal without an assignment is a user.
    pub async fn resolve(&self, principal: Option<&str>) -> Result<Caller, TempleError> {
        let Some(principal) = principal.filter(|p| !p.trim().is_empty()) else {
            return Ok(Caller::guest());
        };
        let role = self
            .store
            .get_role(principal)
            .await?
            .unwrap_or(UserRole::User);
        Ok(Caller::new(principal, role))
    }

    #[instrument(skip(self, caller))]
    pub async fn assign_role(
        &self,
        caller: &Caller,
        principal: &str,
        role: UserRole,
    ) -> Result<(), TempleError> {
        caller.require_admin("assignCallerUserRole")?;
        if principal.trim().is_empty() {
            return Err(TempleError::InvalidInput(
                "principal must not be empty".to_string(),
            ));
        }
        self.store.assign_role(principal, role).await?;
        info!(
            assigned_by = caller.principal.as_deref().unwrap_or("-"),
            "Role assigned"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::InMemoryRepository;

    #[tokio::test]
    async fn resolution_defaults() {
        let access = AccessControl::new(Arc::new(InMemoryRepository::new(0)));
        access.bootstrap_admins(&["root".to_string()]).await.unwrap();

        assert_eq!(access.resolve(None).await.unwrap(), Caller::guest());
        assert_eq!(access.resolve(Some("")).await.unwrap(), Caller::guest());
        assert_eq!(access.resolve(Some("devotee")).await.unwrap().role, UserRole::User);
        assert!(access.resolve(Some("root")).await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn only_admins_assign_roles() {
        let access = AccessControl::new(Arc::new(InMemoryRepository::new(0)));
        let user = Caller::new("devotee", UserRole::User);

        let err = access
            .assign_role(&user, "devotee", UserRole::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, TempleError::Unauthorized(_)));
        assert_eq!(access.resolve(Some("devotee")).await.unwrap().role, UserRole::User);

        let admin = Caller::new("root", UserRole::Admin);
        access
            .assign_role(&admin, "devotee", UserRole::Admin)
            .await
            .unwrap();
        assert!(access.resolve(Some("devotee")).await.unwrap().is_admin());
    }
}
