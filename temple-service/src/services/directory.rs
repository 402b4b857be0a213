//! Temple directory: committee, contacts, jatres and gallery.

use crate::error::TempleError;
use crate::models::{
    Caller, CommitteeMember, CommitteeMemberInput, CommitteeMemberPublic, ContactInput,
    GalleryItem, GalleryItemInput, GalleryItemUpdate, Jatre, JatreInput, TempleContact,
};
use crate::services::repository::Store;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn Store>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // Committee

    /// Public view of the committee, without phone numbers.
    pub async fn committee(&self) -> Result<Vec<CommitteeMemberPublic>, TempleError> {
        let members = self.store.list_committee_members().await?;
        Ok(members.iter().map(CommitteeMemberPublic::from).collect())
    }

    pub async fn committee_full(
        &self,
        caller: &Caller,
    ) -> Result<Vec<CommitteeMember>, TempleError> {
        caller.require_admin("getCommitteeMembersAdmin")?;
        self.store.list_committee_members().await
    }

    #[instrument(skip(self, caller, input), fields(name = %input.name))]
    pub async fn add_committee_member(
        &self,
        caller: &Caller,
        input: CommitteeMemberInput,
    ) -> Result<CommitteeMember, TempleError> {
        caller.require_admin("addCommitteeMember")?;
        input.validate()?;
        let member = self.store.add_committee_member(input).await?;
        info!(member_id = member.id, "Committee member added");
        Ok(member)
    }

    #[instrument(skip(self, caller, input))]
    pub async fn edit_committee_member(
        &self,
        caller: &Caller,
        id: i64,
        input: CommitteeMemberInput,
    ) -> Result<CommitteeMember, TempleError> {
        caller.require_admin("editCommitteeMember")?;
        input.validate()?;
        self.store.edit_committee_member(id, input).await
    }

    #[instrument(skip(self, caller))]
    pub async fn remove_committee_member(&self, caller: &Caller, id: i64) -> Result<(), TempleError> {
        caller.require_admin("removeCommitteeMember")?;
        self.store.remove_committee_member(id).await?;
        info!(member_id = id, "Committee member removed");
        Ok(())
    }

    // Contacts

    pub async fn contacts(&self) -> Result<Vec<TempleContact>, TempleError> {
        self.store.list_contacts().await
    }

    #[instrument(skip(self, caller, input))]
    pub async fn add_contact(
        &self,
        caller: &Caller,
        input: ContactInput,
    ) -> Result<TempleContact, TempleError> {
        caller.require_admin("addContact")?;
        input.validate()?;
        self.store.add_contact(input).await
    }

    #[instrument(skip(self, caller, input))]
    pub async fn edit_contact(
        &self,
        caller: &Caller,
        id: i64,
        input: ContactInput,
    ) -> Result<TempleContact, TempleError> {
        caller.require_admin("editContact")?;
        input.validate()?;
        self.store.edit_contact(id, input).await
    }

    #[instrument(skip(self, caller))]
    pub async fn remove_contact(&self, caller: &Caller, id: i64) -> Result<(), TempleError> {
        caller.require_admin("removeContact")?;
        self.store.remove_contact(id).await
    }

    // Jatres

    /// Events, earliest first.
    pub async fn jatres(&self) -> Result<Vec<Jatre>, TempleError> {
        self.store.list_jatres().await
    }

    #[instrument(skip(self, caller, input), fields(name = %input.name))]
    pub async fn add_jatre(&self, caller: &Caller, input: JatreInput) -> Result<Jatre, TempleError> {
        caller.require_admin("addJatre")?;
        input.validate()?;
        let jatre = self.store.add_jatre(input).await?;
        info!(jatre_id = jatre.id, "Jatre added");
        Ok(jatre)
    }

    #[instrument(skip(self, caller, input))]
    pub async fn edit_jatre(
        &self,
        caller: &Caller,
        id: i64,
        input: JatreInput,
    ) -> Result<Jatre, TempleError> {
        caller.require_admin("editJatre")?;
        input.validate()?;
        self.store.edit_jatre(id, input).await
    }

    #[instrument(skip(self, caller))]
    pub async fn remove_jatre(&self, caller: &Caller, id: i64) -> Result<(), TempleError> {
        caller.require_admin("removeJatre")?;
        self.store.remove_jatre(id).await
    }

    // Gallery

    pub async fn gallery(&self) -> Result<Vec<GalleryItem>, TempleError> {
        self.store.list_gallery_items().await
    }

    #[instrument(skip(self, caller, input), fields(title = %input.title))]
    pub async fn add_gallery_item(
        &self,
        caller: &Caller,
        input: GalleryItemInput,
    ) -> Result<GalleryItem, TempleError> {
        caller.require_admin("addGalleryItem")?;
        input.validate()?;
        let item = self.store.add_gallery_item(input).await?;
        info!(item_id = item.id, media_type = %item.media_type, "Gallery item added");
        Ok(item)
    }

    #[instrument(skip(self, caller, update))]
    pub async fn edit_gallery_item(
        &self,
        caller: &Caller,
        id: i64,
        update: GalleryItemUpdate,
    ) -> Result<GalleryItem, TempleError> {
        caller.require_admin("editGalleryItem")?;
        update.validate()?;
        self.store.edit_gallery_item(id, update).await
    }

    #[instrument(skip(self, caller))]
    pub async fn remove_gallery_item(&self, caller: &Caller, id: i64) -> Result<(), TempleError> {
        caller.require_admin("removeGalleryItem")?;
        self.store.remove_gallery_item(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommitteeRole, UserRole};
    use crate::services::memory::InMemoryRepository;
    use chrono::{TimeZone, Utc};

    fn service() -> DirectoryService {
        DirectoryService::new(Arc::new(InMemoryRepository::new(0)))
    }

    fn admin() -> Caller {
        Caller::new("root", UserRole::Admin)
    }

    #[tokio::test]
    async fn public_committee_hides_mobile_number() {
        let svc = service();
        svc.add_committee_member(
            &admin(),
            CommitteeMemberInput {
                name: "Ramappa".to_string(),
                role: CommitteeRole::President,
                mobile_number: "9000000000".to_string(),
            },
        )
        .await
        .unwrap();

        let public = svc.committee().await.unwrap();
        assert_eq!(public.len(), 1);
        let json = serde_json::to_value(&public[0]).unwrap();
        assert!(json.get("mobileNumber").is_none());

        let full = svc.committee_full(&admin()).await.unwrap();
        assert_eq!(full[0].mobile_number, "9000000000");
        assert!(matches!(
            svc.committee_full(&Caller::guest()).await,
            Err(TempleError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn jatres_are_listed_by_date() {
        let svc = service();
        for (name, month) in [("Late", 9), ("Early", 2)] {
            svc.add_jatre(
                &admin(),
                JatreInput {
                    name: name.to_string(),
                    date: Utc.with_ymd_and_hms(2025, month, 1, 0, 0, 0).unwrap(),
                    description: String::new(),
                    activities: vec!["Pooja".to_string()],
                },
            )
            .await
            .unwrap();
        }

        let names: Vec<_> = svc.jatres().await.unwrap().into_iter().map(|j| j.name).collect();
        assert_eq!(names, vec!["Early", "Late"]);
    }

    #[tokio::test]
    async fn gallery_edit_keeps_blob_url() {
        let svc = service();
        let item = svc
            .add_gallery_item(
                &admin(),
                GalleryItemInput {
                    title: "Gopura".to_string(),
                    description: "Front view".to_string(),
                    media_type: "image".to_string(),
                    blob_url: "https://blobs.example/gopura.jpg".to_string(),
                },
            )
            .await
            .unwrap();

        let edited = svc
            .edit_gallery_item(
                &admin(),
                item.id,
                GalleryItemUpdate {
                    title: "Gopura at dawn".to_string(),
                    description: item.description.clone(),
                    media_type: "image".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.title, "Gopura at dawn");
        assert_eq!(edited.blob_url, item.blob_url);
    }

    #[tokio::test]
    async fn blank_required_text_is_invalid_input() {
        let svc = service();
        let err = svc
            .add_contact(
                &admin(),
                ContactInput {
                    contact_type: "  ".to_string(),
                    contact_number: "080-000".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TempleError::InvalidInput(_)));
        assert!(svc.contacts().await.unwrap().is_empty());
    }
}
