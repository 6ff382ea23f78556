//! Users and scan owner enrichment

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use super::ApiContext;
use crate::cache::{CacheTtl, cache_key, ns};
use crate::client::models::Scan;
use crate::client::payload::{self, Record};
use crate::error::{ApiError, Result};

const USERS_PATH: &str = "/was/v2/users";

/// Display details for a scan owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// User operations
#[derive(Clone, Copy)]
pub struct UsersApi<'a> {
    ctx: ApiContext<'a>,
}

impl<'a> UsersApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Result<Vec<Record>> {
        let raw = self
            .ctx
            .cached(
                ns::USERS,
                &cache_key(USERS_PATH, &[]),
                CacheTtl::USERS,
                || self.ctx.transport.get(USERS_PATH),
            )
            .await?;
        let malformed = raw
            .get("items")
            .or_else(|| raw.get("users"))
            .is_some_and(|items| !items.is_array() && !items.is_null());
        if malformed {
            return Err(ApiError::InvalidResponse("malformed users listing".into()).into());
        }
        Ok(payload::records_under(raw, &["items", "users"]))
    }

    pub async fn get(&self, user_id: &str) -> Result<Record> {
        match self.ctx.transport.get(&format!("{}/{}", USERS_PATH, user_id)).await? {
            Value::Object(user) => Ok(user),
            _ => Err(ApiError::InvalidResponse(format!(
                "malformed user details for {}",
                user_id
            ))
            .into()),
        }
    }

    /// user_id → owner details, for every user with an ID.
    pub async fn owner_map(&self) -> Result<HashMap<String, Owner>> {
        Ok(self
            .list()
            .await?
            .iter()
            .filter_map(|user| {
                let id = payload::record_str(user, &["user_id", "id"])?;
                Some((
                    id,
                    Owner {
                        email: payload::record_str(user, &["email"]),
                        name: payload::record_str(user, &["name", "username"]),
                    },
                ))
            })
            .collect())
    }

    /// Add `owner_email` / `owner_name` to each scan; unknown owners get nulls.
    pub async fn enrich_scans(&self, scans: Vec<Scan>) -> Result<Vec<Scan>> {
        let owners = self.owner_map().await?;
        Ok(scans
            .into_iter()
            .map(|mut scan| {
                let owner = scan
                    .owner_id
                    .as_ref()
                    .and_then(|id| owners.get(id))
                    .cloned()
                    .unwrap_or_default();
                scan.extra.insert("owner_email".into(), owner.email.into());
                scan.extra.insert("owner_name".into(), owner.name.into());
                scan
            })
            .collect())
    }
}
