//! Monitoring portal API client
//!
//! One HTTP GET per logical call against the portal's single `/public/`
//! endpoint. Every response uses the same envelope `{err, desc, dat}`:
//! `err == 0` carries the payload under `dat`, anything else carries a
//! description that is classified here, once, into the typed failure the
//! refresh engine drives its retry policy from. String matching on `desc`
//! happens only in this module.
//!
//! The portal speaks plaintext HTTP; request authenticity rests entirely on
//! the SHA-1 signature scheme in [`crate::signing`]. That is a weakness of
//! the upstream protocol preserved for wire compatibility.

use crate::config::{CredentialsConfig, PortalConfig};
use crate::error::{HeliotropeError, Result};
use crate::logging::get_logger;
use crate::session::AuthSession;
use crate::signing;
use serde_json::Value;

/// A plant as listed by the portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plant {
    pub plant_id: u64,
    pub plant_name: String,
}

/// Daily profit and environmental offsets for one plant
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfitDay {
    pub profit: f64,
    pub coal: f64,
    pub co2: f64,
    pub so2: f64,
}

/// Portal operations used by the refresh engine.
///
/// Seam for tests; the engine only ever talks to the portal through this.
#[async_trait::async_trait]
pub trait PortalApi: Send + Sync {
    /// Exchange credentials for a fresh token/secret pair
    async fn authenticate(&self, credentials: &CredentialsConfig) -> Result<AuthSession>;

    /// List the plants visible to the account
    async fn list_plants(&self, session: &AuthSession) -> Result<Vec<Plant>>;

    /// Instantaneous output power in kW
    async fn query_current_power(&self, session: &AuthSession, plant_id: u64) -> Result<f64>;

    /// Energy produced today in kWh
    async fn query_daily_energy(&self, session: &AuthSession, plant_id: u64) -> Result<f64>;

    /// Today's profit and environmental offsets
    async fn query_daily_profit(&self, session: &AuthSession, plant_id: u64) -> Result<ProfitDay>;
}

/// HTTP client for ShineMonitor-compatible portals
pub struct ShineClient {
    base_url: String,
    http: reqwest::Client,
    logger: crate::logging::StructuredLogger,
}

impl ShineClient {
    /// Create a new client with a bounded per-request timeout
    pub fn new(config: &PortalConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            logger: get_logger("api"),
        })
    }

    /// Build a signed data-call URL. The action fragment is appended to the
    /// URL byte-for-byte as it was signed.
    fn query_url(&self, session: &AuthSession, action: &str) -> String {
        let salt = signing::make_salt();
        let sign = signing::sign_query(&session.secret, &session.token, &salt, action);
        format!(
            "{}/public/?sign={}&token={}&salt={}{}",
            self.base_url, sign, session.token, salt, action
        )
    }

    /// Issue one GET and unwrap the response envelope to its `dat` payload
    async fn get_envelope(&self, url: &str) -> Result<Value> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            self.logger
                .error(&format!("Portal request failed with status {}", status));
            return Err(HeliotropeError::transport(format!(
                "Portal request failed with status {}",
                status
            )));
        }

        let body: Value = response.json().await?;
        if body.get("err").and_then(|v| v.as_i64()) == Some(0) {
            return Ok(body.get("dat").cloned().unwrap_or(Value::Null));
        }

        let desc = body
            .get("desc")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown portal error");
        Err(classify_failure(desc))
    }
}

/// Map a non-zero envelope description to its typed failure
fn classify_failure(desc: &str) -> HeliotropeError {
    if desc == "ERR_NO_RECORD" {
        HeliotropeError::NoRecord
    } else if desc.contains("ERR_NO_AUTH") {
        HeliotropeError::auth_expired(desc)
    } else {
        HeliotropeError::api(desc)
    }
}

/// Portal payloads carry numbers both as JSON numbers and as strings
fn value_to_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[async_trait::async_trait]
impl PortalApi for ShineClient {
    async fn authenticate(&self, credentials: &CredentialsConfig) -> Result<AuthSession> {
        let action = format!(
            "&action=auth&usr={}&company-key={}",
            credentials.username, credentials.company_key
        );
        let salt = signing::make_salt();
        let password_hash = signing::hash_password(&credentials.password);
        let sign = signing::sign_auth(&password_hash, &salt, &action);
        // No token parameter on the initial authentication call
        let url = format!(
            "{}/public/?sign={}&salt={}{}",
            self.base_url, sign, salt, action
        );

        let dat = self.get_envelope(&url).await?;
        let token = dat.get("token").and_then(|v| v.as_str());
        let secret = dat.get("secret").and_then(|v| v.as_str());
        match (token, secret) {
            (Some(token), Some(secret)) => {
                Ok(AuthSession::new(token.to_string(), secret.to_string()))
            }
            _ => Err(HeliotropeError::transport(
                "Authentication response missing token or secret",
            )),
        }
    }

    async fn list_plants(&self, session: &AuthSession) -> Result<Vec<Plant>> {
        let url = self.query_url(session, "&action=queryPlants");
        let dat = self.get_envelope(&url).await?;

        let entries = dat
            .get("plant")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut plants = Vec::with_capacity(entries.len());
        for entry in &entries {
            let plant_id = entry.get("pid").and_then(|p| {
                p.as_u64()
                    .or_else(|| p.as_str().and_then(|s| s.parse().ok()))
            });
            let plant_name = entry.get("name").and_then(|n| n.as_str());
            if let (Some(plant_id), Some(plant_name)) = (plant_id, plant_name) {
                plants.push(Plant {
                    plant_id,
                    plant_name: plant_name.to_string(),
                });
            }
        }
        Ok(plants)
    }

    async fn query_current_power(&self, session: &AuthSession, plant_id: u64) -> Result<f64> {
        // The portal spells the action this way; the typo is part of the
        // signed bytes and must not be corrected.
        let action = format!(
            "&action=queryPlantsActiveOuputPowerCurrent&plantid={}",
            plant_id
        );
        let url = self.query_url(session, &action);

        let dat = match self.get_envelope(&url).await {
            Ok(dat) => dat,
            Err(HeliotropeError::NoRecord) => return Ok(0.0),
            Err(e) => return Err(e),
        };

        value_to_f64(dat.get("outputPower")).ok_or_else(|| {
            HeliotropeError::transport("Current power response missing outputPower")
        })
    }

    async fn query_daily_energy(&self, session: &AuthSession, plant_id: u64) -> Result<f64> {
        let action = format!("&action=queryPlantEnergyDay&plantid={}", plant_id);
        let url = self.query_url(session, &action);

        let dat = match self.get_envelope(&url).await {
            Ok(dat) => dat,
            Err(HeliotropeError::NoRecord) => return Ok(0.0),
            Err(e) => return Err(e),
        };

        value_to_f64(dat.get("energy"))
            .ok_or_else(|| HeliotropeError::transport("Daily energy response missing energy"))
    }

    async fn query_daily_profit(&self, session: &AuthSession, plant_id: u64) -> Result<ProfitDay> {
        let action = format!("&action=queryPlantsProfitOneDay&plantid={}", plant_id);
        let url = self.query_url(session, &action);

        let dat = match self.get_envelope(&url).await {
            Ok(dat) => dat,
            Err(HeliotropeError::NoRecord) => return Ok(ProfitDay::default()),
            Err(e) => return Err(e),
        };

        // Absent fields default to 0; the portal omits metrics it has not
        // computed yet for the day.
        let plant = dat
            .get("plant")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .cloned()
            .unwrap_or(Value::Null);

        Ok(ProfitDay {
            profit: value_to_f64(plant.get("profit")).unwrap_or(0.0),
            coal: value_to_f64(plant.get("coal")).unwrap_or(0.0),
            co2: value_to_f64(plant.get("co2")).unwrap_or(0.0),
            so2: value_to_f64(plant.get("so2")).unwrap_or(0.0),
        })
    }
}
