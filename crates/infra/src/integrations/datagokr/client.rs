//! Client for the administrative-registry and apartment-trade services

use std::time::Duration;

use aptmap_common::resilience::SlidingWindow;
use aptmap_domain::{
    AptMapError, DatagoCredentials, Result, RATE_LIMIT_MAX_CALLS, RATE_LIMIT_PERIOD_SECS,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::envelope;
use crate::http::paging::{fetch_all, Termination};
use crate::http::{decode_response, HttpClient};

const DEFAULT_BASE_URL: &str = "http://apis.data.go.kr";
const REGISTRY_PATH: &str = "/1741000/StanReginCd/getStanReginCdList";
const TRADE_PATH: &str = "/1613000/RTMSDataSvcAptTrade/getRTMSDataSvcAptTrade";
const TRADE_DETAILED_PATH: &str = "/1613000/RTMSDataSvcAptTradeDev/getRTMSDataSvcAptTradeDev";

/// Client for the registry and trade-record endpoints.
///
/// Each endpoint method owns its sliding-window limiter so the per-endpoint
/// quotas stay independent; every page request passes through the limiter.
pub struct DatagokrClient {
    http: HttpClient,
    credentials: DatagoCredentials,
    base_url: String,
    code_limiter: SlidingWindow,
    trade_limiter: SlidingWindow,
    trade_detailed_limiter: SlidingWindow,
    cancel: CancellationToken,
}

impl DatagokrClient {
    /// Create a client. Fails fast on empty credentials.
    pub fn new(credentials: DatagoCredentials) -> Result<Self> {
        let http = HttpClient::new()?;
        Ok(Self {
            http,
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            code_limiter: default_limiter()?,
            trade_limiter: default_limiter()?,
            trade_detailed_limiter: default_limiter()?,
            cancel: CancellationToken::new(),
        })
    }

    /// Attach a cancellation token; limiter waits abort when it fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Point the client at a different host (for testing).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch administrative-code rows, optionally filtered by locality name.
    ///
    /// The registry reports a total count in its page head; pages are
    /// fetched until the computed page count is reached.
    pub async fn lookup_codes(&self, region: Option<&str>, page_size: u32) -> Result<Vec<Value>> {
        let url = format!("{}{}", self.base_url, REGISTRY_PATH);

        let records = fetch_all(page_size, Termination::PageCount, |page| {
            let url = url.clone();
            async move {
                self.code_limiter
                    .acquire_cancellable(&self.cancel)
                    .await
                    .map_err(|_| AptMapError::Cancelled)?;

                let mut query: Vec<(&str, String)> = vec![
                    ("serviceKey", self.credentials.service_key.clone()),
                    ("pageNo", page.to_string()),
                    ("numOfRows", page_size.to_string()),
                    ("type", "json".to_string()),
                ];
                if let Some(region) = region {
                    query.push(("locatadd_nm", region.to_string()));
                }

                let body = self.http.get_text(&url, &query).await?;
                let decoded = decode_response(&body)?;
                envelope::parse_registry_page(&decoded)
            }
        })
        .await?;

        info!(count = records.len(), region, "fetched administrative codes");
        Ok(records)
    }

    /// Fetch one district's apartment trades for one contract month
    /// (`deal_ymd` is `YYYYMM`).
    pub async fn lookup_trades(
        &self,
        lawd_cd: &str,
        deal_ymd: &str,
        page_size: u32,
    ) -> Result<Vec<Value>> {
        self.trades_at(TRADE_PATH, &self.trade_limiter, lawd_cd, deal_ymd, page_size).await
    }

    /// Like [`lookup_trades`](Self::lookup_trades) but against the extended
    /// endpoint that carries the full detail columns.
    pub async fn lookup_trades_detailed(
        &self,
        lawd_cd: &str,
        deal_ymd: &str,
        page_size: u32,
    ) -> Result<Vec<Value>> {
        self.trades_at(TRADE_DETAILED_PATH, &self.trade_detailed_limiter, lawd_cd, deal_ymd, page_size)
            .await
    }

    async fn trades_at(
        &self,
        path: &str,
        limiter: &SlidingWindow,
        lawd_cd: &str,
        deal_ymd: &str,
        page_size: u32,
    ) -> Result<Vec<Value>> {
        let url = format!("{}{}", self.base_url, path);

        let records = fetch_all(page_size, Termination::ItemCount, |page| {
            let url = url.clone();
            async move {
                limiter
                    .acquire_cancellable(&self.cancel)
                    .await
                    .map_err(|_| AptMapError::Cancelled)?;

                let query: Vec<(&str, String)> = vec![
                    ("serviceKey", self.credentials.service_key.clone()),
                    ("LAWD_CD", lawd_cd.to_string()),
                    ("DEAL_YMD", deal_ymd.to_string()),
                    ("numOfRows", page_size.to_string()),
                    ("pageNo", page.to_string()),
                ];

                let body = self.http.get_text(&url, &query).await?;
                let decoded = decode_response(&body)?;
                envelope::parse_trade_page(&decoded)
            }
        })
        .await?;

        info!(count = records.len(), lawd_cd, deal_ymd, "fetched apartment trades");
        Ok(records)
    }
}

fn default_limiter() -> Result<SlidingWindow> {
    SlidingWindow::new(RATE_LIMIT_MAX_CALLS, Duration::from_secs(RATE_LIMIT_PERIOD_SECS))
        .map_err(AptMapError::Internal)
}
