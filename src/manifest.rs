//! Artwork Manifest - provenance record for one generated image
//!
//! request_hash and image_hash are reproducible; id and created_at are not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::ColorPipeline;
use crate::composition::LayerCounts;
use crate::generator::Artwork;
use crate::hashing::{compute_manifest_hash, compute_request_hash};
use crate::validation::ValidationNotice;
use crate::ENGINE_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkManifest {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub seed: String,
    pub themes: Vec<String>,
    pub agent_ids: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub palette: Vec<String>,
    pub color_pipeline: ColorPipeline,
    pub layers: LayerCounts,
    pub notices: Vec<ValidationNotice>,
    pub request_hash: String,
    pub image_hash: String,
    pub manifest_hash: String,
}

impl ArtworkManifest {
    pub fn from_artwork(artwork: &Artwork) -> Result<Self, serde_json::Error> {
        let request = &artwork.request;
        let mut manifest = Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            seed: request.seed.clone(),
            themes: request.themes.clone(),
            agent_ids: request.agent_ids.clone(),
            width: request.width,
            height: request.height,
            palette: artwork.palette.to_hex(),
            color_pipeline: artwork.color_pipeline,
            layers: artwork.layers,
            notices: request.notices.clone(),
            request_hash: compute_request_hash(request, artwork.color_pipeline, ENGINE_VERSION)?,
            image_hash: artwork.image_hash(),
            manifest_hash: String::new(), // Computed after
        };

        manifest.manifest_hash = compute_manifest_hash(&manifest)?;
        Ok(manifest)
    }
}
