//! 推論API連携モジュール
//!
//! 画像を `POST <api_url>/predict/` (multipart, フィールド名 `file`) に送り、
//! 犬種・信頼度・上位3候補・犬種情報を受け取る。

use crate::error::{PawScanError, Result};
use crate::scanner::ImageInfo;
use paw_scan_common::PredictionResult;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

const PREDICT_PATH: &str = "/predict/";

pub struct PredictionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(api_url: &str, timeout_seconds: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            endpoint: predict_endpoint(api_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 画像ファイルを送信して推論結果を取得
    pub async fn predict_file(&self, image: &ImageInfo) -> Result<PredictionResult> {
        let bytes = tokio::fs::read(&image.path).await?;
        if bytes.is_empty() {
            return Err(PawScanError::EmptyImage(image.path.display().to_string()));
        }
        self.predict_bytes(bytes, &image.file_name, image.mime_type()).await
    }

    pub async fn predict_bytes(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<PredictionResult> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        tracing::debug!(endpoint = %self.endpoint, file_name, "sending prediction request");

        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::error!(%status, body = %body, "prediction API returned non-OK status");
            return Err(PawScanError::ApiCall(format!("status {}: {}", status, body)));
        }

        parse_prediction(&body)
    }
}

/// ベースURLから推論エンドポイントを組み立てる（末尾スラッシュの有無を吸収）
pub fn predict_endpoint(api_url: &str) -> String {
    let base = api_url.trim_end_matches('/');
    if base.ends_with(PREDICT_PATH.trim_end_matches('/')) {
        format!("{}/", base)
    } else {
        format!("{}{}", base, PREDICT_PATH)
    }
}

/// レスポンス本文をパース
pub fn parse_prediction(body: &str) -> Result<PredictionResult> {
    serde_json::from_str(body).map_err(|e| PawScanError::ApiParse(format!("{}: {}", e, truncate(body, 200))))
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
