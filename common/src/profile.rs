//! 飼い犬プロフィールの保存

use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::types::DogProfile;

pub const PROFILE_KEY: &str = "dogProfile_v1";

/// 単一キーに1件のプロフィールを保存するストア
#[derive(Debug)]
pub struct DogProfileStore<S> {
    backend: S,
}

impl<S: KeyValueStore> DogProfileStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn into_inner(self) -> S {
        self.backend
    }

    /// 保存（書き込み失敗はそのまま返す）
    pub fn save(&mut self, profile: &DogProfile) -> Result<()> {
        let raw = serde_json::to_string(profile)?;
        self.backend.set(PROFILE_KEY, &raw)
    }

    /// 読み込み（未保存・破損時は `None`）
    pub fn load(&self) -> Option<DogProfile> {
        let raw = match self.backend.get(PROFILE_KEY) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read dog profile");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "stored dog profile is corrupt");
                None
            }
        }
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.backend.remove(PROFILE_KEY) {
            tracing::error!(error = %e, "failed to clear dog profile");
        }
    }
}
