//! Master data managed by admins: theatres, slots and addons.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    models::{AddonCategory, AddonEntity, SlotEntity, TheatreEntity, TheatreWithSlots},
    params::{AddonParams, CreateSlotParams, CreateTheatreParams, FieldErrors, ValidateParams},
    repositories::{AddonsRepository, SlotsRepository, StoreError, TheatresRepository},
};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid request")]
    Validation(FieldErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("request references an unknown slot")]
    UnknownReference,

    #[error(transparent)]
    Store(StoreError),
}

impl CatalogError {
    fn from_store(entity: &'static str) -> impl Fn(StoreError) -> CatalogError {
        move |err| match err {
            StoreError::NotFound => CatalogError::NotFound(entity),
            StoreError::MissingReference(_) => CatalogError::UnknownReference,
            err => CatalogError::Store(err),
        }
    }
}

fn check(errors: FieldErrors) -> Result<(), CatalogError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::Validation(errors))
    }
}

pub struct TheatresService {
    theatres: Arc<dyn TheatresRepository>,
}

impl TheatresService {
    pub fn new(theatres: Arc<dyn TheatresRepository>) -> Self {
        Self { theatres }
    }

    pub async fn create(
        &self,
        params: CreateTheatreParams,
        admin_id: Uuid,
    ) -> Result<TheatreEntity, CatalogError> {
        check(params.validate_params())?;

        let slot_ids = params
            .slots
            .iter()
            .filter_map(|id| Uuid::parse_str(id).ok())
            .collect();
        let now = Utc::now();
        let theatre = TheatreEntity {
            id: Uuid::new_v4(),
            name: params.name,
            description: params.description,
            price: params.price,
            additional_price_per_head: params.additional_price_per_head,
            min_capacity: params.min_capacity,
            max_capacity: params.max_capacity,
            default_capacity: params.default_capacity,
            created_at: now,
            updated_at: now,
            created_by: admin_id,
            updated_by: admin_id,
        };

        self.theatres
            .create(theatre.clone(), slot_ids)
            .await
            .map_err(CatalogError::from_store("theatre"))?;
        tracing::info!(theatre_id = %theatre.id, %admin_id, "Theatre created");
        Ok(theatre)
    }

    pub async fn list(&self) -> Result<Vec<TheatreEntity>, CatalogError> {
        self.theatres
            .list()
            .await
            .map_err(CatalogError::from_store("theatre"))
    }

    pub async fn get_with_slots(&self, id: Uuid) -> Result<TheatreWithSlots, CatalogError> {
        self.theatres
            .get_with_slots(id)
            .await
            .map_err(CatalogError::from_store("theatre"))
    }
}

pub struct SlotsService {
    slots: Arc<dyn SlotsRepository>,
}

impl SlotsService {
    pub fn new(slots: Arc<dyn SlotsRepository>) -> Self {
        Self { slots }
    }

    pub async fn create(
        &self,
        params: CreateSlotParams,
        admin_id: Uuid,
    ) -> Result<SlotEntity, CatalogError> {
        check(params.validate_params())?;

        let now = Utc::now();
        let slot = SlotEntity {
            id: Uuid::new_v4(),
            start_time: params.start_time,
            end_time: params.end_time,
            created_at: now,
            updated_at: now,
            created_by: admin_id,
            updated_by: admin_id,
        };
        self.slots
            .create(slot.clone())
            .await
            .map_err(CatalogError::from_store("slot"))?;
        tracing::info!(slot_id = %slot.id, %admin_id, "Slot created");
        Ok(slot)
    }

    pub async fn list(&self) -> Result<Vec<SlotEntity>, CatalogError> {
        self.slots
            .list()
            .await
            .map_err(CatalogError::from_store("slot"))
    }
}

pub struct AddonsService {
    addons: Arc<dyn AddonsRepository>,
}

impl AddonsService {
    pub fn new(addons: Arc<dyn AddonsRepository>) -> Self {
        Self { addons }
    }

    pub async fn create(
        &self,
        params: AddonParams,
        admin_id: Uuid,
    ) -> Result<AddonEntity, CatalogError> {
        check(params.validate_params())?;

        let now = Utc::now();
        let addon = AddonEntity {
            id: Uuid::new_v4(),
            name: params.name,
            category: params.category,
            price: params.price,
            meta_data: Value::Object(params.meta_data),
            created_at: now,
            updated_at: now,
            created_by: admin_id,
            updated_by: admin_id,
        };
        self.addons
            .create(addon.clone())
            .await
            .map_err(CatalogError::from_store("addon"))?;
        tracing::info!(addon_id = %addon.id, %admin_id, "Addon created");
        Ok(addon)
    }

    pub async fn list(&self) -> Result<Vec<AddonEntity>, CatalogError> {
        self.addons
            .list()
            .await
            .map_err(CatalogError::from_store("addon"))
    }

    pub fn categories(&self) -> Vec<AddonCategory> {
        AddonCategory::all()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::repositories::memory::MemoryStore;

    #[tokio::test]
    async fn theatre_is_stamped_and_returned_with_slots() {
        let store = Arc::new(MemoryStore::default());
        let slots = SlotsService::new(store.clone());
        let theatres = TheatresService::new(store.clone());
        let admin = Uuid::new_v4();

        let evening = slots
            .create(
                CreateSlotParams {
                    start_time: 1080,
                    end_time: 1260,
                },
                admin,
            )
            .await
            .unwrap();
        let morning = slots
            .create(
                CreateSlotParams {
                    start_time: 540,
                    end_time: 720,
                },
                admin,
            )
            .await
            .unwrap();

        let theatre = theatres
            .create(
                CreateTheatreParams {
                    name: "Aurora".into(),
                    description: "Recliners and a 4K projector".into(),
                    price: 1999.0,
                    additional_price_per_head: 249.0,
                    min_capacity: 2,
                    max_capacity: 12,
                    default_capacity: 6,
                    slots: vec![evening.id.to_string(), morning.id.to_string()],
                },
                admin,
            )
            .await
            .unwrap();

        assert_eq!(theatre.created_by, admin);
        let detail = theatres.get_with_slots(theatre.id).await.unwrap();
        let starts: Vec<i32> = detail.slots.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![540, 1080]);
    }

    #[tokio::test]
    async fn unknown_theatre_is_not_found() {
        let theatres = TheatresService::new(Arc::new(MemoryStore::default()));
        let err = theatres.get_with_slots(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound("theatre")));
    }

    #[tokio::test]
    async fn invalid_slot_is_rejected_before_storage() {
        let slots = SlotsService::new(Arc::new(MemoryStore::default()));
        let err = slots
            .create(
                CreateSlotParams {
                    start_time: 700,
                    end_time: 600,
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref e) if e.contains_key("start_time")));
        assert!(slots.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn addon_keeps_meta_data() {
        let addons = AddonsService::new(Arc::new(MemoryStore::default()));
        let mut meta = Map::new();
        meta.insert("flavour".into(), Value::String("chocolate".into()));

        let addon = addons
            .create(
                AddonParams {
                    name: "Truffle cake".into(),
                    category: "Cakes".into(),
                    price: 650.0,
                    meta_data: meta,
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();

        assert_eq!(addon.meta_data["flavour"], "chocolate");
        assert_eq!(addons.list().await.unwrap().len(), 1);
        assert_eq!(addons.categories().len(), 4);
    }
}
