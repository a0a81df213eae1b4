use std::sync::Arc;
use serde_json::{json, Value};
use crate::errors::CoordError;
use crate::models::UserProfile;
use super::documents::{Collection, Direction, Document, DocumentStore, FilterOp, Query};

pub const PROFILES: &str = "user_profiles";

#[derive(Clone)]
pub struct ProfileStore {
    collection: Collection,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { collection: Collection::new(store, PROFILES) }
    }

    pub fn create(&self, profile: &UserProfile) -> Result<String, CoordError> {
        let mut data = serde_json::to_value(profile)?;
        if let Value::Object(map) = &mut data {
            map.remove("id");
        }
        self.collection.add(data)
    }

    pub fn get_by_user(&self, user_id: &str) -> Result<Option<UserProfile>, CoordError> {
        let q = Query::new()
            .filter("user_id", FilterOp::Eq, json!(user_id))
            .order_by("updated_at", Direction::Desc)
            .limit(1);
        self.collection.query(&q)?.into_iter().next().map(Document::decode).transpose()
    }

    /// Every profile with known coordinates, in registration order.
    pub fn list_with_coordinates(&self) -> Result<Vec<UserProfile>, CoordError> {
        let q = Query::new()
            .filter("location", FilterOp::Ne, Value::Null)
            .order_by("created_at", Direction::Asc);
        let profiles: Vec<UserProfile> = self.collection.query(&q)?
            .into_iter()
            .map(Document::decode)
            .collect::<Result<_, _>>()?;
        Ok(profiles.into_iter().filter(|p| p.location.is_some()).collect())
    }
}
